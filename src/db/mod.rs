use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

pub mod store;

use crate::error::MonitorError;
pub use store::SqlEventStore;

/// Initialize the SQLite database connection pool and run migrations
pub async fn init_db(
    db_path: impl AsRef<Path>,
    max_connections: u32,
) -> Result<SqlitePool, MonitorError> {
    let db_path = db_path.as_ref();
    let db_path_str = db_path.to_string_lossy();

    // Ensure the database file exists or create it
    if !db_path.exists() {
        info!("Database file not found at {}, creating...", db_path_str);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MonitorError::DatabaseError(format!("Failed to create database directory: {}", e))
            })?;
        }
        std::fs::File::create(db_path).map_err(|e| {
            MonitorError::DatabaseError(format!("Failed to create database file: {}", e))
        })?;
    }

    let db_url = format!("sqlite:{}", db_path_str);
    info!("Connecting to database at {}", db_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(&db_url)
        .await
        .map_err(|e| MonitorError::DatabaseError(format!("Failed to connect to database: {}", e)))?;

    migrate(&pool).await?;
    info!("Database initialized successfully");
    Ok(pool)
}

/// Open a private in-memory database, used by tests and throwaway runs.
/// A single long-lived connection keeps the database alive.
pub async fn open_in_memory() -> Result<SqlitePool, MonitorError> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .map_err(|e| {
            MonitorError::DatabaseError(format!("Failed to open in-memory database: {}", e))
        })?;

    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<(), MonitorError> {
    info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| MonitorError::DatabaseError(format!("Failed to run migrations: {}", e)))
}
