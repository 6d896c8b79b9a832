// ABOUTME: Data layer and persistence for sysconf
// ABOUTME: Storage errors, connection configuration, and SQLite pool setup with migrations

pub mod config;
pub mod sqlite;

use thiserror::Error;

pub use config::{sysconf_dir, StorageConfig};
pub use sqlite::{connect, initialize, open, MIGRATOR};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Setting not found: {0}")]
    NotFound(String),
    #[error("Duplicate setting key: {0}")]
    DuplicateKey(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Failed to decode setting value: {0}")]
    Decode(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Returns true when the error is a SQLite UNIQUE constraint violation
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            // SQLITE_CONSTRAINT_UNIQUE / SQLITE_CONSTRAINT_PRIMARYKEY
            matches!(db_err.code().as_deref(), Some("2067") | Some("1555"))
        }
        _ => false,
    }
}
