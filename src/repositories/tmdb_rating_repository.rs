// src/repositories/tmdb_rating_repository.rs
//
// Ratings persistence (upsert variant, keyed to TMDB ids)
//
// Lets users rate movies that were never imported into the local
// catalog. rate() is insert-or-update in one statement and merges the
// display snapshot on conflict, so a re-rate refreshes everything.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::domain::movie::MovieSnapshot;
use crate::domain::rating::TmdbRating;
use crate::domain::validation::{
    validate_max_len, validate_positive_id, validate_rating_value, REVIEW_MAX,
};
use crate::error::{AppError, AppResult};

pub trait TmdbRatingRepository: Send + Sync {
    /// Insert or update the user's rating, review and snapshot in one call
    fn rate(
        &self,
        user_id: i64,
        tmdb_id: i64,
        rating: f64,
        review: Option<&str>,
        snapshot: &MovieSnapshot,
    ) -> AppResult<()>;
    fn get(&self, user_id: i64, tmdb_id: i64) -> AppResult<Option<TmdbRating>>;
    /// Remove a rating; succeeds even when none exists
    fn remove(&self, user_id: i64, tmdb_id: i64) -> AppResult<()>;
    /// Newest-first listing of everything a user has rated
    fn list_for_user(&self, user_id: i64) -> AppResult<Vec<TmdbRating>>;
    /// Mean rating rounded to one decimal; None when no ratings exist
    fn average_rating(&self, tmdb_id: i64) -> AppResult<Option<f64>>;
    fn ratings_count(&self, tmdb_id: i64) -> AppResult<i64>;
}

pub struct SqliteTmdbRatingRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteTmdbRatingRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map a database row to a TmdbRating - returns rusqlite::Error for
    /// query_map compatibility
    fn row_to_rating(row: &Row) -> Result<TmdbRating, rusqlite::Error> {
        let created_at = super::parse_timestamp(row, "created_at")?;
        let updated_at = super::parse_timestamp(row, "updated_at")?;

        Ok(TmdbRating {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            tmdb_id: row.get("tmdb_id")?,
            rating: row.get("rating")?,
            review: row.get("review")?,
            title: row.get("title")?,
            poster_url: row.get("poster_url")?,
            year: row.get("year")?,
            category: row.get("category")?,
            created_at,
            updated_at,
        })
    }
}

impl TmdbRatingRepository for SqliteTmdbRatingRepository {
    fn rate(
        &self,
        user_id: i64,
        tmdb_id: i64,
        rating: f64,
        review: Option<&str>,
        snapshot: &MovieSnapshot,
    ) -> AppResult<()> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("tmdb_id", tmdb_id)?;
        validate_rating_value(rating)?;
        if let Some(review) = review {
            validate_max_len("Review", review, REVIEW_MAX)?;
        }

        let conn = get_connection(&self.pool)?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            "INSERT INTO tmdb_ratings
                 (user_id, tmdb_id, rating, review, title, poster_url, year, category,
                  created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT (user_id, tmdb_id) DO UPDATE SET
                 rating = excluded.rating,
                 review = excluded.review,
                 title = excluded.title,
                 poster_url = excluded.poster_url,
                 year = excluded.year,
                 category = excluded.category,
                 updated_at = excluded.updated_at",
            params![
                user_id,
                tmdb_id,
                rating,
                review,
                snapshot.title,
                snapshot.poster_url,
                snapshot.year,
                snapshot.category,
                now,
            ],
        )
        .map_err(|e| AppError::storage("rate tmdb movie", e))?;

        Ok(())
    }

    fn get(&self, user_id: i64, tmdb_id: i64) -> AppResult<Option<TmdbRating>> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("tmdb_id", tmdb_id)?;

        let conn = get_connection(&self.pool)?;

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, tmdb_id, rating, review, title, poster_url, year,
                        category, created_at, updated_at
                 FROM tmdb_ratings
                 WHERE user_id = ?1 AND tmdb_id = ?2",
            )
            .map_err(|e| AppError::storage("prepare tmdb rating lookup", e))?;

        match stmt.query_row(params![user_id, tmdb_id], Self::row_to_rating) {
            Ok(rating) => Ok(Some(rating)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::storage("tmdb rating lookup", e)),
        }
    }

    fn remove(&self, user_id: i64, tmdb_id: i64) -> AppResult<()> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("tmdb_id", tmdb_id)?;

        let conn = get_connection(&self.pool)?;

        conn.execute(
            "DELETE FROM tmdb_ratings WHERE user_id = ?1 AND tmdb_id = ?2",
            params![user_id, tmdb_id],
        )
        .map_err(|e| AppError::storage("remove tmdb rating", e))?;

        Ok(())
    }

    fn list_for_user(&self, user_id: i64) -> AppResult<Vec<TmdbRating>> {
        validate_positive_id("user_id", user_id)?;

        let conn = get_connection(&self.pool)?;

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, tmdb_id, rating, review, title, poster_url, year,
                        category, created_at, updated_at
                 FROM tmdb_ratings
                 WHERE user_id = ?1
                 ORDER BY updated_at DESC, id DESC",
            )
            .map_err(|e| AppError::storage("prepare tmdb rating listing", e))?;

        let ratings = stmt
            .query_map(params![user_id], Self::row_to_rating)
            .map_err(|e| AppError::storage("list tmdb ratings", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage("map tmdb rating rows", e))?;

        Ok(ratings)
    }

    fn average_rating(&self, tmdb_id: i64) -> AppResult<Option<f64>> {
        validate_positive_id("tmdb_id", tmdb_id)?;

        let conn = get_connection(&self.pool)?;

        let average: Option<f64> = conn
            .query_row(
                "SELECT AVG(rating) FROM tmdb_ratings WHERE tmdb_id = ?1",
                params![tmdb_id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::storage("average tmdb rating", e))?;

        Ok(average.map(|v| (v * 10.0).round() / 10.0))
    }

    fn ratings_count(&self, tmdb_id: i64) -> AppResult<i64> {
        validate_positive_id("tmdb_id", tmdb_id)?;

        let conn = get_connection(&self.pool)?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM tmdb_ratings WHERE tmdb_id = ?1",
                params![tmdb_id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::storage("count tmdb ratings", e))?;

        Ok(count)
    }
}
