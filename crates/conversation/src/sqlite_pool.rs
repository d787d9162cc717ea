//! SQLite connection pool wrapper.

use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Manages a single SQLite pool; creates the DB file (and its directory) if missing.
#[derive(Clone)]
pub struct SqlitePoolManager {
    pool: SqlitePool,
}

impl SqlitePoolManager {
    /// Creates a pool for the given database file path.
    pub async fn new(database_url: &str) -> Result<Self, sqlx::Error> {
        info!(database_url = %database_url, "Initializing SQLite pool");

        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .create_if_missing(true)
            .filename(database_url);

        let pool = SqlitePool::connect_with(options).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
