// src/domain/rating.rs
//
// Rating Associations
//
// Two variants exist side by side:
// - Rating: keyed to the local catalog, strict add/update separation
// - TmdbRating: keyed to a TMDB id, upsert semantics, carries a
//   display snapshot

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's rating of a catalog movie (1.0 to 10.0), optionally with a
/// written review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    /// Internal identifier
    pub id: i64,

    pub user_id: i64,

    pub movie_id: i64,

    /// Rating value, 1.0 to 10.0 inclusive
    pub rating: f64,

    pub review: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Last time the rating or review changed
    pub updated_at: DateTime<Utc>,
}

/// A user's rating of a TMDB movie that may not be in the local catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbRating {
    /// Internal identifier
    pub id: i64,

    pub user_id: i64,

    pub tmdb_id: i64,

    /// Rating value, 1.0 to 10.0 inclusive
    pub rating: f64,

    pub review: Option<String>,

    /// Snapshot: movie title at rate time
    pub title: Option<String>,

    /// Snapshot: poster URL at rate time
    pub poster_url: Option<String>,

    /// Snapshot: release year at rate time
    pub year: Option<i32>,

    /// Snapshot: genre label at rate time
    pub category: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}
