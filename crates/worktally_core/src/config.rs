//! Runtime configuration resolved from environment variables.
//!
//! | Variable | Meaning | Default |
//! |---|---|---|
//! | `WORKTALLY_DB_PATH` | SQLite database file | in-memory database |
//! | `WORKTALLY_LOG_LEVEL` | `trace`..`error` | [`default_log_level`] |
//! | `WORKTALLY_LOG_DIR` | absolute directory for rolling logs | logging disabled |

use crate::logging::default_log_level;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "WORKTALLY_DB_PATH";
pub const LOG_LEVEL_VAR: &str = "WORKTALLY_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "WORKTALLY_LOG_DIR";

/// Settings needed to open a store and start logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// `None` means a private in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// `None` leaves file logging off.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl StoreConfig {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            db_path: read(DB_PATH_VAR).map(PathBuf::from),
            log_level: read(LOG_LEVEL_VAR).unwrap_or(defaults.log_level),
            log_dir: read(LOG_DIR_VAR).map(PathBuf::from),
        }
    }
}
