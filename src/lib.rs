// src/lib.rs
// CineTrack - Movie catalog core
//
// Architecture:
// - Domain-centric: entities and validation rules live in `domain`
// - Explicit: no implicit behavior, no hidden connections
// - Query construction: `query::FilterBuilder` accumulates validated
//   predicates and emits parameterized SQL
// - Repositories: dumb, validated data mappers over a shared pool
//
// HTML rendering, sessions, CSRF and the TMDB HTTP client are callers
// of this crate, not part of it.

// ============================================================================
// MODULES
// ============================================================================

pub mod db;
pub mod domain;
pub mod error;
pub mod query;
pub mod repositories;

// ============================================================================
// PUBLIC API - Domain Entities
// ============================================================================

pub use domain::{Favorite, Movie, MovieSnapshot, Rating, TmdbRating, WatchLaterEntry};

// ============================================================================
// PUBLIC API - Error Types
// ============================================================================

pub use error::{AppError, AppResult, ErrorKind, ErrorResponse};

// ============================================================================
// PUBLIC API - Query Construction
// ============================================================================

pub use query::{BuiltQuery, FilterBuilder, SortDirection, SortField};

// ============================================================================
// PUBLIC API - Database
// ============================================================================

pub use db::{create_connection_pool, initialize_database, ConnectionPool};

// ============================================================================
// PUBLIC API - Repositories
// ============================================================================

pub use repositories::{
    FavoriteRepository,
    MovieRepository,
    RatingRepository,
    SqliteFavoriteRepository,
    SqliteMovieRepository,
    SqliteRatingRepository,
    SqliteTmdbRatingRepository,
    SqliteWatchLaterRepository,
    TmdbRatingRepository,
    WatchLaterRepository,
};
