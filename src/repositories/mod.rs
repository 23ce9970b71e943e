// src/repositories/mod.rs
//
// Repository layer
//
// CRITICAL RULES:
// - Validate input before any store access
// - Explicit SQL only
// - Uniqueness lives in the schema's unique indexes
// - Store failures are logged here, surfaced generically
// - NO cross-repository calls

use rusqlite::Row;

pub mod favorite_repository;
pub mod movie_repository;
pub mod rating_repository;
pub mod tmdb_rating_repository;
pub mod watch_later_repository;

pub use favorite_repository::{FavoriteRepository, SqliteFavoriteRepository};
pub use movie_repository::{MovieRepository, SqliteMovieRepository};
pub use rating_repository::{RatingRepository, SqliteRatingRepository};
pub use tmdb_rating_repository::{SqliteTmdbRatingRepository, TmdbRatingRepository};
pub use watch_later_repository::{SqliteWatchLaterRepository, WatchLaterRepository};

/// Parse an RFC 3339 timestamp column - returns rusqlite::Error for
/// query_map compatibility. The column index in the error is looked up
/// from the statement itself, never hand-maintained.
pub(crate) fn parse_timestamp(
    row: &Row,
    column: &str,
) -> Result<chrono::DateTime<chrono::Utc>, rusqlite::Error> {
    let raw: String = row.get(column)?;
    chrono::DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                row.as_ref().column_index(column).unwrap_or_default(),
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("Invalid {} timestamp '{}': {}", column, raw, e),
                )),
            )
        })
}

/// Nullable variant of [`parse_timestamp`]
pub(crate) fn parse_optional_timestamp(
    row: &Row,
    column: &str,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, rusqlite::Error> {
    let raw: Option<String> = row.get(column)?;
    match raw {
        Some(_) => parse_timestamp(row, column).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;

    #[test]
    fn test_timestamp_error_reports_actual_column_index() {
        let pool = create_test_pool().unwrap();
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO favorites (user_id, movie_id, title, created_at)
             VALUES (1, 2, 'Alien', 'not-a-timestamp')",
            [],
        )
        .unwrap();

        // created_at sits at index 1 in this projection; the error must
        // report that index, not the column's position in the table
        let err = conn
            .query_row("SELECT user_id, created_at FROM favorites", [], |row| {
                parse_timestamp(row, "created_at").map(|_| ())
            })
            .unwrap_err();

        match err {
            rusqlite::Error::FromSqlConversionFailure(idx, _, _) => assert_eq!(idx, 1),
            other => panic!("expected conversion failure, got {:?}", other),
        }
    }

    #[test]
    fn test_optional_timestamp_null_is_none() {
        let pool = create_test_pool().unwrap();
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO watch_later (user_id, movie_id, created_at)
             VALUES (1, 2, '2026-08-23T10:00:00+00:00')",
            [],
        )
        .unwrap();

        let watched_at = conn
            .query_row("SELECT watched_at FROM watch_later", [], |row| {
                parse_optional_timestamp(row, "watched_at")
            })
            .unwrap();
        assert!(watched_at.is_none());
    }
}
