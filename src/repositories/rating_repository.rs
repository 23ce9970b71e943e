// src/repositories/rating_repository.rs
//
// Ratings persistence (strict variant, keyed to the local catalog)
//
// add fails if a rating exists, update/delete fail if none does. The
// exists pre-check in add only buys a clean message; the unique index
// is the guard that actually holds under concurrent requests, so a
// constraint violation from the insert maps to the same conflict.

use std::sync::Arc;

use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::domain::rating::Rating;
use crate::domain::validation::{
    validate_max_len, validate_positive_id, validate_rating_value, RATINGS_PAGE_MAX, REVIEW_MAX,
};
use crate::error::{AppError, AppResult};

pub trait RatingRepository: Send + Sync {
    /// Create a rating; conflicts if one already exists for the pair
    fn add(&self, user_id: i64, movie_id: i64, rating: f64, review: Option<&str>)
        -> AppResult<()>;
    /// Change an existing rating; not-found if none exists
    fn update(
        &self,
        user_id: i64,
        movie_id: i64,
        rating: f64,
        review: Option<&str>,
    ) -> AppResult<()>;
    /// Delete an existing rating; not-found if none exists
    fn delete(&self, user_id: i64, movie_id: i64) -> AppResult<()>;
    fn get(&self, user_id: i64, movie_id: i64) -> AppResult<Option<Rating>>;
    /// Mean rating rounded to one decimal; None when no ratings exist
    /// (no data is not a zero score)
    fn average_rating(&self, movie_id: i64) -> AppResult<Option<f64>>;
    fn ratings_count(&self, movie_id: i64) -> AppResult<i64>;
    /// Newest-first page of a movie's ratings; limit is clamped to 1000
    fn all_ratings(&self, movie_id: i64, limit: u32, offset: u32) -> AppResult<Vec<Rating>>;
}

pub struct SqliteRatingRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteRatingRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }

    /// Map a database row to a Rating - returns rusqlite::Error for
    /// query_map compatibility
    fn row_to_rating(row: &Row) -> Result<Rating, rusqlite::Error> {
        let created_at = super::parse_timestamp(row, "created_at")?;
        let updated_at = super::parse_timestamp(row, "updated_at")?;

        Ok(Rating {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            movie_id: row.get("movie_id")?,
            rating: row.get("rating")?,
            review: row.get("review")?,
            created_at,
            updated_at,
        })
    }

    fn validate_input(
        user_id: i64,
        movie_id: i64,
        rating: f64,
        review: Option<&str>,
    ) -> AppResult<()> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("movie_id", movie_id)?;
        validate_rating_value(rating)?;
        if let Some(review) = review {
            validate_max_len("Review", review, REVIEW_MAX)?;
        }
        Ok(())
    }
}

/// A unique-index violation on insert means another request won the
/// race; report it as the same conflict the pre-check would have
fn map_insert_error(err: rusqlite::Error) -> AppError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            AppError::conflict("Rating already exists for this movie")
        }
        _ => AppError::storage("insert rating", err),
    }
}

impl RatingRepository for SqliteRatingRepository {
    fn add(
        &self,
        user_id: i64,
        movie_id: i64,
        rating: f64,
        review: Option<&str>,
    ) -> AppResult<()> {
        Self::validate_input(user_id, movie_id, rating, review)?;

        let conn = get_connection(&self.pool)?;

        // Fast-path pre-check for a friendly error; the unique index
        // still guards the race below
        let exists: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM ratings WHERE user_id = ?1 AND movie_id = ?2",
                params![user_id, movie_id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::storage("rating existence check", e))?;

        if exists > 0 {
            return Err(AppError::conflict("Rating already exists for this movie"));
        }

        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO ratings (user_id, movie_id, rating, review, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![user_id, movie_id, rating, review, now],
        )
        .map_err(map_insert_error)?;

        Ok(())
    }

    fn update(
        &self,
        user_id: i64,
        movie_id: i64,
        rating: f64,
        review: Option<&str>,
    ) -> AppResult<()> {
        Self::validate_input(user_id, movie_id, rating, review)?;

        let conn = get_connection(&self.pool)?;

        let rows_affected = conn
            .execute(
                "UPDATE ratings
                 SET rating = ?3, review = ?4, updated_at = ?5
                 WHERE user_id = ?1 AND movie_id = ?2",
                params![
                    user_id,
                    movie_id,
                    rating,
                    review,
                    Utc::now().to_rfc3339()
                ],
            )
            .map_err(|e| AppError::storage("update rating", e))?;

        if rows_affected == 0 {
            return Err(AppError::not_found("Rating"));
        }

        Ok(())
    }

    fn delete(&self, user_id: i64, movie_id: i64) -> AppResult<()> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("movie_id", movie_id)?;

        let conn = get_connection(&self.pool)?;

        let rows_affected = conn
            .execute(
                "DELETE FROM ratings WHERE user_id = ?1 AND movie_id = ?2",
                params![user_id, movie_id],
            )
            .map_err(|e| AppError::storage("delete rating", e))?;

        if rows_affected == 0 {
            return Err(AppError::not_found("Rating"));
        }

        Ok(())
    }

    fn get(&self, user_id: i64, movie_id: i64) -> AppResult<Option<Rating>> {
        validate_positive_id("user_id", user_id)?;
        validate_positive_id("movie_id", movie_id)?;

        let conn = get_connection(&self.pool)?;

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, movie_id, rating, review, created_at, updated_at
                 FROM ratings
                 WHERE user_id = ?1 AND movie_id = ?2",
            )
            .map_err(|e| AppError::storage("prepare rating lookup", e))?;

        match stmt.query_row(params![user_id, movie_id], Self::row_to_rating) {
            Ok(rating) => Ok(Some(rating)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::storage("rating lookup", e)),
        }
    }

    fn average_rating(&self, movie_id: i64) -> AppResult<Option<f64>> {
        validate_positive_id("movie_id", movie_id)?;

        let conn = get_connection(&self.pool)?;

        // AVG over zero rows is NULL, which is exactly the "no data"
        // answer callers need to distinguish from a 0.0 score
        let average: Option<f64> = conn
            .query_row(
                "SELECT AVG(rating) FROM ratings WHERE movie_id = ?1",
                params![movie_id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::storage("average rating", e))?;

        Ok(average.map(|v| (v * 10.0).round() / 10.0))
    }

    fn ratings_count(&self, movie_id: i64) -> AppResult<i64> {
        validate_positive_id("movie_id", movie_id)?;

        let conn = get_connection(&self.pool)?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM ratings WHERE movie_id = ?1",
                params![movie_id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::storage("count ratings", e))?;

        Ok(count)
    }

    fn all_ratings(&self, movie_id: i64, limit: u32, offset: u32) -> AppResult<Vec<Rating>> {
        validate_positive_id("movie_id", movie_id)?;
        if limit == 0 {
            return Err(AppError::validation("Limit must be a positive integer"));
        }
        let limit = limit.min(RATINGS_PAGE_MAX);

        let conn = get_connection(&self.pool)?;

        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, movie_id, rating, review, created_at, updated_at
                 FROM ratings
                 WHERE movie_id = ?1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?2 OFFSET ?3",
            )
            .map_err(|e| AppError::storage("prepare rating listing", e))?;

        let ratings = stmt
            .query_map(params![movie_id, limit, offset], Self::row_to_rating)
            .map_err(|e| AppError::storage("list ratings", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage("map rating rows", e))?;

        Ok(ratings)
    }
}
