// src/db/connection.rs
//
// Database connection management
//
// PRINCIPLES:
// - Explicit connection pooling
// - No hidden connection creation
// - Clear error propagation
// - Thread-safe access

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Type alias for connection pool
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled connection
pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Get the database file path
///
/// Database is stored in the application data directory.
/// Path structure: {APP_DATA}/cinetrack/cinetrack.db
pub fn get_database_path() -> AppResult<PathBuf> {
    let app_data_dir = dirs::data_dir().ok_or_else(|| {
        log::error!("could not determine app data directory");
        AppError::OperationFailed
    })?;

    let cinetrack_dir = app_data_dir.join("cinetrack");

    // Ensure directory exists
    std::fs::create_dir_all(&cinetrack_dir).map_err(|e| {
        log::error!("failed to create data directory: {}", e);
        AppError::OperationFailed
    })?;

    Ok(cinetrack_dir.join("cinetrack.db"))
}

/// Create a connection pool
///
/// Pool configuration:
/// - Max 15 connections (reasonable for a single-node web backend)
/// - SQLite in WAL mode for better concurrency
/// - Foreign keys enabled
/// - Busy timeout set to avoid immediate errors
pub fn create_connection_pool() -> AppResult<ConnectionPool> {
    let db_path = get_database_path()?;
    create_connection_pool_at(&db_path)
}

/// Create a connection pool for an explicit database file
pub fn create_connection_pool_at(db_path: &std::path::Path) -> AppResult<ConnectionPool> {
    let manager = SqliteConnectionManager::file(db_path).with_init(|conn| {
        // Foreign key support is not on by default in SQLite
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    });

    let pool = Pool::builder().max_size(15).build(manager).map_err(|e| {
        log::error!("failed to create connection pool: {}", e);
        AppError::OperationFailed
    })?;

    Ok(pool)
}

/// Get a connection from the pool
///
/// Convenience wrapper that logs pool exhaustion/connectivity problems.
pub fn get_connection(pool: &ConnectionPool) -> AppResult<PooledConn> {
    pool.get().map_err(AppError::from)
}

/// Create an in-memory pool with the schema applied (for testing)
///
/// Capped at a single connection: an in-memory SQLite manager hands each
/// connection its own private database, so a larger pool would split state.
pub fn create_test_pool() -> AppResult<ConnectionPool> {
    let manager = SqliteConnectionManager::memory().with_init(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    });

    let pool = Pool::builder().max_size(1).build(manager).map_err(|e| {
        log::error!("failed to create test pool: {}", e);
        AppError::OperationFailed
    })?;

    let conn = pool.get()?;
    crate::db::migrations::initialize_database(&conn)?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_backed_pool_creation() {
        let dir = tempfile::tempdir().unwrap();
        let pool = create_connection_pool_at(&dir.path().join("test.db")).unwrap();
        let conn = get_connection(&pool).unwrap();

        // Verify foreign keys are enabled
        let fk_enabled: i32 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(fk_enabled, 1);
    }

    #[test]
    fn test_test_pool_shares_state() {
        let pool = create_test_pool().unwrap();

        {
            let conn = pool.get().unwrap();
            conn.execute(
                "INSERT INTO movies (title, score, created_at) VALUES ('Alien', 8.5, datetime('now'))",
                [],
            )
            .unwrap();
        }

        // A second checkout must see the same database
        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM movies", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
