//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve log level, data directory, snapshot database path and workspace key.
//! - Cache the resolved configuration once per process.
//!
//! # Invariants
//! - `data_dir` and `db_path` are absolute.
//! - `log_level` is one of the levels accepted by `init_logging`.

use crate::logging::{default_log_level, normalize_level};
use crate::repo::snapshot_repo::DEFAULT_WORKSPACE_KEY;
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "WORKITEMS_LOG_LEVEL";
pub const ENV_DATA_DIR: &str = "WORKITEMS_DATA_DIR";
pub const ENV_DB_PATH: &str = "WORKITEMS_DB_PATH";
pub const ENV_WORKSPACE: &str = "WORKITEMS_WORKSPACE";

const DEFAULT_DATA_DIR_NAME: &str = "workitems-manager";
const DB_FILE_NAME: &str = "workitems.sqlite3";
const LOG_DIR_NAME: &str = "logs";

static GLOBAL_CONFIG: OnceCell<CoreConfig> = OnceCell::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Log level value is not supported.
    InvalidLogLevel(String),
    /// Directory or file path is not absolute.
    RelativePath { key: &'static str, value: PathBuf },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{message}"),
            Self::RelativePath { key, value } => {
                write!(f, "{key} must be an absolute path, got `{}`", value.display())
            }
        }
    }
}

impl Error for ConfigError {}

/// Resolved core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub log_level: &'static str,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub workspace_key: String,
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary key lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let log_level = match read(ENV_LOG_LEVEL) {
            Some(raw) => normalize_level(&raw).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        let data_dir = match read(ENV_DATA_DIR) {
            Some(raw) => absolute(ENV_DATA_DIR, PathBuf::from(raw))?,
            None => std::env::temp_dir().join(DEFAULT_DATA_DIR_NAME),
        };

        let db_path = match read(ENV_DB_PATH) {
            Some(raw) => absolute(ENV_DB_PATH, PathBuf::from(raw))?,
            None => data_dir.join(DB_FILE_NAME),
        };

        let workspace_key =
            read(ENV_WORKSPACE).unwrap_or_else(|| DEFAULT_WORKSPACE_KEY.to_string());

        Ok(Self {
            log_level,
            data_dir,
            db_path,
            workspace_key,
        })
    }

    /// Process-wide configuration, resolved from the environment on first use.
    pub fn global() -> Result<&'static Self, ConfigError> {
        GLOBAL_CONFIG.get_or_try_init(Self::from_env)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }
}

fn absolute(key: &'static str, value: PathBuf) -> Result<PathBuf, ConfigError> {
    if value.is_absolute() {
        Ok(value)
    } else {
        Err(ConfigError::RelativePath { key, value })
    }
}
