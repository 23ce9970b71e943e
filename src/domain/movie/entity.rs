use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog movie (imported from TMDB or seeded locally)
///
/// The association layer only reads and filters movies; imports happen
/// outside this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    /// Internal identifier
    pub id: i64,

    /// TMDB identifier, when the movie came from an import
    pub tmdb_id: Option<i64>,

    /// Display title
    pub title: String,

    /// Plot synopsis
    pub description: Option<String>,

    /// Single genre label
    pub category: Option<String>,

    /// Aggregate score, 0.0 to 10.0
    pub score: f64,

    /// Release year
    pub year: Option<i32>,

    /// Runtime in minutes
    pub runtime: Option<i32>,

    pub director: Option<String>,

    /// Comma-separated principal cast
    pub actors: Option<String>,

    pub poster_url: Option<String>,

    pub backdrop_url: Option<String>,

    /// When the movie entered the catalog
    pub created_at: DateTime<Utc>,
}

/// Display fields copied onto an association at write time, so lists can
/// render without re-querying the catalog or TMDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieSnapshot {
    pub title: String,
    pub poster_url: Option<String>,
    pub year: Option<i32>,
    pub category: Option<String>,
}

impl MovieSnapshot {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            poster_url: None,
            year: None,
            category: None,
        }
    }
}

impl From<&Movie> for MovieSnapshot {
    fn from(movie: &Movie) -> Self {
        Self {
            title: movie.title.clone(),
            poster_url: movie.poster_url.clone(),
            year: movie.year,
            category: movie.category.clone(),
        }
    }
}
