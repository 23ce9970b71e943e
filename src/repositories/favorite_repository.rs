// src/repositories/favorite_repository.rs
//
// Favorites persistence
//
// One row per (user, movie), guarded by a unique index. Adding an
// existing favorite refreshes the snapshot; removing an absent one
// succeeds, because the desired end state already holds.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::domain::favorite::Favorite;
use crate::domain::movie::MovieSnapshot;
use crate::domain::validation::validate_positive_id;
use crate::error::{AppError, AppResult};

pub trait FavoriteRepository: Send + Sync {
    /// Add or refresh a favorite (idempotent upsert)
    fn add(&self, user_id: i64, movie_id: i64, snapshot: &MovieSnapshot) -> AppResult<()>;
    /// Remove a favorite; succeeds even when none exists
    fn remove(&self, user_id: i64, movie_id: i64) -> AppResult<()>;
    fn is_favorite(&self, user_id: i64, movie_id: i64) -> AppResult<bool>;
    /// Newest-first listing of a user's favorites
    fn list(&self, user_id: i64) -> AppResult<Vec<Favorite>>;
    fn count(&self, user_id: i64) -> AppResult<i64>;
    /// Movie ids only, for fast membership checks when rendering lists
    fn movie_ids(&self, user_id: i64) -> AppResult<Vec<i64>>;
}

pub struct SqliteFavoriteRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteFavoriteRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map a database row to a Favorite - returns rusqlite::Error for
    /// query_map compatibility
    fn row_to_favorite(row: &Row) -> Result<Favorite, rusqlite::Error> {
        let created_at = super::parse_timestamp(row, "created_at")?;

        Ok(Favorite {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            movie_id: row.get("movie_id")?,
            title: row.get("title")?,
            poster_url: row.get("poster_url")?,
            year: row.get("year")?,
            category: row.get("category")?,
            created_at,
        })
    }
}

impl FavoriteRepository for SqliteFavoriteRepository {
    fn add(&self, user_id: i64, movie_id: i64, snapshot: &MovieSnapshot) -> AppResult<()> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("movie_id", movie_id)?;

        let conn = get_connection(&self.pool)?;

        // Re-adding refreshes the snapshot; created_at keeps the first
        // add time
        conn.execute(
            "INSERT INTO favorites (user_id, movie_id, title, poster_url, year, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT (user_id, movie_id) DO UPDATE SET
                 title = excluded.title,
                 poster_url = excluded.poster_url,
                 year = excluded.year,
                 category = excluded.category",
            params![
                user_id,
                movie_id,
                snapshot.title,
                snapshot.poster_url,
                snapshot.year,
                snapshot.category,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| AppError::storage("add favorite", e))?;

        Ok(())
    }

    fn remove(&self, user_id: i64, movie_id: i64) -> AppResult<()> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("movie_id", movie_id)?;

        let conn = get_connection(&self.pool)?;

        // Zero rows affected is fine: not-favorited is the goal state
        conn.execute(
            "DELETE FROM favorites WHERE user_id = ?1 AND movie_id = ?2",
            params![user_id, movie_id],
        )
        .map_err(|e| AppError::storage("remove favorite", e))?;

        Ok(())
    }

    fn is_favorite(&self, user_id: i64, movie_id: i64) -> AppResult<bool> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("movie_id", movie_id)?;

        let conn = get_connection(&self.pool)?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM favorites WHERE user_id = ?1 AND movie_id = ?2",
                params![user_id, movie_id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::storage("favorite membership check", e))?;

        Ok(count > 0)
    }

    fn list(&self, user_id: i64) -> AppResult<Vec<Favorite>> {
        validate_positive_id("user_id", user_id)?;

        let conn = get_connection(&self.pool)?;

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, movie_id, title, poster_url, year, category, created_at
                 FROM favorites
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id DESC",
            )
            .map_err(|e| AppError::storage("prepare favorite listing", e))?;

        let favorites = stmt
            .query_map(params![user_id], Self::row_to_favorite)
            .map_err(|e| AppError::storage("list favorites", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage("map favorite rows", e))?;

        Ok(favorites)
    }

    fn count(&self, user_id: i64) -> AppResult<i64> {
        validate_positive_id("user_id", user_id)?;

        let conn = get_connection(&self.pool)?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM favorites WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::storage("count favorites", e))?;

        Ok(count)
    }

    fn movie_ids(&self, user_id: i64) -> AppResult<Vec<i64>> {
        validate_positive_id("user_id", user_id)?;

        let conn = get_connection(&self.pool)?;

        let mut stmt = conn
            .prepare("SELECT movie_id FROM favorites WHERE user_id = ?1")
            .map_err(|e| AppError::storage("prepare favorite id listing", e))?;

        let ids = stmt
            .query_map(params![user_id], |row| row.get::<_, i64>(0))
            .map_err(|e| AppError::storage("list favorite ids", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage("map favorite id rows", e))?;

        Ok(ids)
    }
}
