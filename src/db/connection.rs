// src/db/connection.rs
//
// Database connection management
//
// PRINCIPLES:
// - Explicit connection pooling
// - No hidden connection creation
// - Clear error propagation
// - Thread-safe access

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;

use crate::error::{AppError, AppResult};

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

const PRAGMAS: &str = "PRAGMA foreign_keys = ON;
                       PRAGMA journal_mode = WAL;
                       PRAGMA synchronous = NORMAL;
                       PRAGMA busy_timeout = 5000;";

/// Create a connection pool for the database file at `db_path`
///
/// Pool configuration:
/// - Max 15 connections
/// - SQLite in WAL mode so readers don't block the sync writer
/// - Foreign keys enabled
/// - Busy timeout set so concurrent context updates wait instead of failing
pub fn create_connection_pool(db_path: &Path) -> AppResult<ConnectionPool> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        conn.execute_batch(PRAGMAS)?;
        Ok(())
    });

    let pool = Pool::builder()
        .max_size(15)
        .build(manager)
        .map_err(|e| AppError::Pool(format!("Failed to create connection pool: {}", e)))?;

    log::debug!("Connection pool ready for {}", db_path.display());
    Ok(pool)
}

/// Create a standalone in-memory connection (for testing)
#[cfg(test)]
pub(crate) fn create_test_connection() -> AppResult<rusqlite::Connection> {
    let conn = rusqlite::Connection::open_in_memory().map_err(AppError::Database)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(AppError::Database)?;
    Ok(conn)
}

/// Pool over a fresh, initialized database file inside `dir` (for testing)
#[cfg(test)]
pub(crate) fn create_test_pool(dir: &tempfile::TempDir) -> std::sync::Arc<ConnectionPool> {
    let pool = create_connection_pool(&dir.path().join("test.db")).unwrap();
    {
        let conn = pool.get().unwrap();
        crate::db::initialize_database(&conn).unwrap();
    }
    std::sync::Arc::new(pool)
}
