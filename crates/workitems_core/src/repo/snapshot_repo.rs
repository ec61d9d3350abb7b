//! Snapshot repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Load and save one `PersistedSnapshot` per workspace key.
//! - Encode snapshots as JSON with the camelCase persisted field names.
//!
//! # Invariants
//! - At most one snapshot row exists per workspace key; saves replace it.
//! - Read paths reject undecodable payloads instead of masking them.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::store::snapshot::PersistedSnapshot;
use crate::store::version::DATA_STRUCTURE_VERSION;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Workspace key used when the host does not scope snapshots.
pub const DEFAULT_WORKSPACE_KEY: &str = "default";

pub type SnapshotRepoResult<T> = Result<T, SnapshotRepoError>;

/// Errors from snapshot persistence.
#[derive(Debug)]
pub enum SnapshotRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Snapshot JSON could not be encoded or decoded.
    Serialization(serde_json::Error),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Workspace key is blank.
    InvalidWorkspaceKey,
}

impl Display for SnapshotRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "invalid snapshot payload: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "snapshot repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidWorkspaceKey => write!(f, "workspace key must not be blank"),
        }
    }
}

impl Error for SnapshotRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::UninitializedConnection { .. } | Self::InvalidWorkspaceKey => None,
        }
    }
}

impl From<DbError> for SnapshotRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SnapshotRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for SnapshotRepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Durable storage for store snapshots.
pub trait SnapshotRepository {
    /// Loads the saved snapshot, if any.
    fn load_snapshot(&self) -> SnapshotRepoResult<Option<PersistedSnapshot>>;
    /// Replaces the saved snapshot.
    fn save_snapshot(&self, snapshot: &PersistedSnapshot) -> SnapshotRepoResult<()>;
    /// Removes the saved snapshot. Returns whether one existed.
    fn clear_snapshot(&self) -> SnapshotRepoResult<bool>;
}

/// SQLite-backed snapshot repository.
///
/// Owns its connection so it can be moved into a store listener.
pub struct SqliteSnapshotRepository {
    conn: Connection,
    workspace_key: String,
}

impl SqliteSnapshotRepository {
    /// Creates a repository over a migrated connection.
    pub fn try_new(
        conn: Connection,
        workspace_key: impl Into<String>,
    ) -> SnapshotRepoResult<Self> {
        let workspace_key = workspace_key.into().trim().to_string();
        if workspace_key.is_empty() {
            return Err(SnapshotRepoError::InvalidWorkspaceKey);
        }
        ensure_snapshot_connection_ready(&conn)?;
        Ok(Self {
            conn,
            workspace_key,
        })
    }

    pub fn workspace_key(&self) -> &str {
        &self.workspace_key
    }

    /// Epoch ms of the last save, if a snapshot exists.
    pub fn saved_at(&self) -> SnapshotRepoResult<Option<i64>> {
        let saved_at = self
            .conn
            .query_row(
                "SELECT saved_at FROM store_snapshots WHERE workspace_key = ?1;",
                [self.workspace_key.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(saved_at)
    }
}

impl SnapshotRepository for SqliteSnapshotRepository {
    fn load_snapshot(&self) -> SnapshotRepoResult<Option<PersistedSnapshot>> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload_json FROM store_snapshots WHERE workspace_key = ?1;",
                [self.workspace_key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|raw| PersistedSnapshot::from_json(raw.as_str()))
            .transpose()
            .map_err(Into::into)
    }

    fn save_snapshot(&self, snapshot: &PersistedSnapshot) -> SnapshotRepoResult<()> {
        let payload = snapshot.to_json()?;
        let version = snapshot
            .data_structure_version
            .as_deref()
            .unwrap_or(DATA_STRUCTURE_VERSION);
        let item_count = i64::try_from(snapshot.item_count()).unwrap_or(i64::MAX);

        self.conn.execute(
            "INSERT INTO store_snapshots (
                workspace_key,
                data_structure_version,
                payload_json,
                item_count,
                saved_at
            ) VALUES (?1, ?2, ?3, ?4, (strftime('%s', 'now') * 1000))
            ON CONFLICT(workspace_key) DO UPDATE SET
                data_structure_version = excluded.data_structure_version,
                payload_json = excluded.payload_json,
                item_count = excluded.item_count,
                saved_at = excluded.saved_at;",
            params![
                self.workspace_key.as_str(),
                version,
                payload,
                item_count
            ],
        )?;
        Ok(())
    }

    fn clear_snapshot(&self) -> SnapshotRepoResult<bool> {
        let removed = self.conn.execute(
            "DELETE FROM store_snapshots WHERE workspace_key = ?1;",
            [self.workspace_key.as_str()],
        )?;
        Ok(removed > 0)
    }
}

fn ensure_snapshot_connection_ready(conn: &Connection) -> SnapshotRepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(SnapshotRepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}
