// ABOUTME: Storage configuration
// ABOUTME: Database location and pool tuning, from defaults or environment variables

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use sysconf_config::{
    DATABASE_FILE_NAME, DATA_DIR_NAME, HOME, SYSCONF_DATABASE_PATH, SYSCONF_DB_BUSY_TIMEOUT_SECS,
    SYSCONF_DB_ENABLE_WAL, SYSCONF_DB_MAX_CONNECTIONS, USERPROFILE,
};

use crate::{StorageError, StorageResult};

/// Get the path to the sysconf directory (~/.sysconf)
pub fn sysconf_dir() -> PathBuf {
    sysconf_dir_from(|name| env::var(name).ok())
}

/// Resolve the data directory from HOME, then USERPROFILE (Windows), then `dirs`
fn sysconf_dir_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    let home = lookup(HOME)
        .or_else(|| lookup(USERPROFILE))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    home.join(DATA_DIR_NAME)
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: sysconf_dir().join(DATABASE_FILE_NAME),
            enable_wal: true,
            max_connections: 5,
            busy_timeout_seconds: 30,
        }
    }
}

impl StorageConfig {
    /// Build a configuration from `SYSCONF_*` environment variables, falling
    /// back to the defaults for anything unset
    pub fn from_env() -> StorageResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`StorageConfig::from_env`] but reads variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> StorageResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup(SYSCONF_DATABASE_PATH).filter(|p| !p.trim().is_empty()) {
            config.path = PathBuf::from(path);
        }

        if let Some(raw) = lookup(SYSCONF_DB_MAX_CONNECTIONS) {
            let max = raw.trim().parse::<u32>().map_err(|_| {
                StorageError::InvalidInput(format!("{}={}", SYSCONF_DB_MAX_CONNECTIONS, raw))
            })?;
            if max == 0 {
                return Err(StorageError::InvalidInput(format!(
                    "{} must be at least 1",
                    SYSCONF_DB_MAX_CONNECTIONS
                )));
            }
            config.max_connections = max;
        }

        if let Some(raw) = lookup(SYSCONF_DB_BUSY_TIMEOUT_SECS) {
            config.busy_timeout_seconds = raw.trim().parse::<u64>().map_err(|_| {
                StorageError::InvalidInput(format!("{}={}", SYSCONF_DB_BUSY_TIMEOUT_SECS, raw))
            })?;
        }

        if let Some(raw) = lookup(SYSCONF_DB_ENABLE_WAL) {
            config.enable_wal = raw.trim().parse::<bool>().unwrap_or(true);
        }

        Ok(config)
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }
}
