// ABOUTME: SQLite connection pool setup
// ABOUTME: Creates the database file, applies pragmas, and runs embedded migrations

use sqlx::migrate::{MigrateDatabase, Migrator};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{debug, info};

use crate::{StorageConfig, StorageError, StorageResult};

/// Embedded migrations for the settings schema
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open a connection pool to the configured database, creating the file if needed
pub async fn connect(config: &StorageConfig) -> StorageResult<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = config.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }
    }

    let database_url = format!("sqlite:{}", config.path.display());

    if !sqlx::Sqlite::database_exists(&database_url)
        .await
        .map_err(StorageError::Sqlx)?
    {
        debug!("Creating database at: {}", database_url);
        sqlx::Sqlite::create_database(&database_url)
            .await
            .map_err(StorageError::Sqlx)?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(config.busy_timeout_seconds))
        .connect(&database_url)
        .await
        .map_err(StorageError::Sqlx)?;

    if config.enable_wal {
        sqlx::query("PRAGMA journal_mode = WAL")
            .execute(&pool)
            .await
            .map_err(StorageError::Sqlx)?;
    }

    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(&pool)
        .await
        .map_err(StorageError::Sqlx)?;

    Ok(pool)
}

/// Run pending migrations against the pool
pub async fn initialize(pool: &SqlitePool) -> StorageResult<()> {
    info!("Initializing settings storage with migrations");

    MIGRATOR.run(pool).await.map_err(StorageError::Migration)?;

    info!("Settings storage initialized successfully");
    Ok(())
}

/// Connect and migrate in one step
pub async fn open(config: &StorageConfig) -> StorageResult<SqlitePool> {
    let pool = connect(config).await?;
    initialize(&pool).await?;
    Ok(pool)
}
