//! SQLite bootstrap for the snapshot persistence adapter.
//!
//! # Responsibility
//! - Open and configure SQLite connections used to persist store snapshots.
//! - Apply adapter schema migrations in deterministic order.
//!
//! # Invariants
//! - Adapter schema version is tracked via `PRAGMA user_version`.
//! - This schema is independent from the store's `dataStructureVersion` tag,
//!   which versions the snapshot payload itself.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to bring the snapshot database to a usable state.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Directory that should hold the snapshot file could not be created.
    CreateDataDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Snapshot tables were laid out by a newer build.
    SchemaTooNew { found: u32, supported: u32 },
}

impl DbError {
    /// Stable code used in `db_open` log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "snapshot_db_sqlite",
            Self::CreateDataDir { .. } => "snapshot_db_dir",
            Self::SchemaTooNew { .. } => "snapshot_db_schema_too_new",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "snapshot database error: {err}"),
            Self::CreateDataDir { path, source } => write!(
                f,
                "cannot create snapshot directory `{}`: {source}",
                path.display()
            ),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "snapshot tables are at layout {found}, this build reads up to {supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDataDir { source, .. } => Some(source),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
