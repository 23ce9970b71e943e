// src/repositories/movie_repository.rs
//
// Movie catalog reads
//
// The catalog is read-only from this layer's perspective; imports and
// seeding happen outside the core.

use std::sync::Arc;

use rusqlite::{params, Row};

use crate::db::{get_connection, ConnectionPool};
use crate::domain::movie::Movie;
use crate::domain::validation::validate_positive_id;
use crate::error::{AppError, AppResult};
use crate::query::FilterBuilder;

pub trait MovieRepository: Send + Sync {
    fn get_by_id(&self, movie_id: i64) -> AppResult<Option<Movie>>;
    fn get_by_tmdb_id(&self, tmdb_id: i64) -> AppResult<Option<Movie>>;
    /// Run a caller-assembled filter against the catalog
    fn search(&self, filter: &FilterBuilder) -> AppResult<Vec<Movie>>;
    /// Count rows matching a filter, ignoring its sort and pagination
    fn count(&self, filter: &FilterBuilder) -> AppResult<i64>;
    /// Distinct genre labels present in the catalog, for filter UIs
    fn categories(&self) -> AppResult<Vec<String>>;
}

pub struct SqliteMovieRepository {
    pool: Arc<ConnectionPool>,
}

impl SqliteMovieRepository {
    pub fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

/// Map a database row to a Movie - returns rusqlite::Error for
/// query_map compatibility
pub(crate) fn row_to_movie(row: &Row) -> Result<Movie, rusqlite::Error> {
    let created_at = super::parse_timestamp(row, "created_at")?;

    Ok(Movie {
        id: row.get("id")?,
        tmdb_id: row.get("tmdb_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        category: row.get("category")?,
        score: row.get("score")?,
        year: row.get("year")?,
        runtime: row.get("runtime")?,
        director: row.get("director")?,
        actors: row.get("actors")?,
        poster_url: row.get("poster_url")?,
        backdrop_url: row.get("backdrop_url")?,
        created_at,
    })
}

impl MovieRepository for SqliteMovieRepository {
    fn get_by_id(&self, movie_id: i64) -> AppResult<Option<Movie>> {
        validate_positive_id("movie_id", movie_id)?;
        let conn = get_connection(&self.pool)?;

        let mut stmt = conn
            .prepare("SELECT * FROM movies WHERE id = ?1")
            .map_err(|e| AppError::storage("prepare movie lookup", e))?;

        match stmt.query_row(params![movie_id], row_to_movie) {
            Ok(movie) => Ok(Some(movie)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::storage("movie lookup", e)),
        }
    }

    fn get_by_tmdb_id(&self, tmdb_id: i64) -> AppResult<Option<Movie>> {
        validate_positive_id("tmdb_id", tmdb_id)?;
        let conn = get_connection(&self.pool)?;

        let mut stmt = conn
            .prepare("SELECT * FROM movies WHERE tmdb_id = ?1")
            .map_err(|e| AppError::storage("prepare movie lookup", e))?;

        match stmt.query_row(params![tmdb_id], row_to_movie) {
            Ok(movie) => Ok(Some(movie)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::storage("movie lookup by tmdb id", e)),
        }
    }

    fn search(&self, filter: &FilterBuilder) -> AppResult<Vec<Movie>> {
        let conn = get_connection(&self.pool)?;
        filter.execute(&conn)
    }

    fn count(&self, filter: &FilterBuilder) -> AppResult<i64> {
        let conn = get_connection(&self.pool)?;
        filter.count(&conn)
    }

    fn categories(&self) -> AppResult<Vec<String>> {
        let conn = get_connection(&self.pool)?;

        let mut stmt = conn
            .prepare(
                "SELECT DISTINCT category FROM movies
                 WHERE category IS NOT NULL
                 ORDER BY category",
            )
            .map_err(|e| AppError::storage("prepare category listing", e))?;

        let categories = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| AppError::storage("list categories", e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::storage("map category rows", e))?;

        Ok(categories)
    }
}
