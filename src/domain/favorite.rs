// src/domain/favorite.rs
//
// Favorite Association
//
// One row per (user, movie). Re-adding an existing favorite refreshes
// the snapshot instead of duplicating or erroring.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's favorited movie, carrying the display snapshot captured at
/// the time the favorite was (last) added
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Favorite {
    /// Internal identifier
    pub id: i64,

    pub user_id: i64,

    pub movie_id: i64,

    /// Snapshot: movie title at add time
    pub title: String,

    /// Snapshot: poster URL at add time
    pub poster_url: Option<String>,

    /// Snapshot: release year at add time
    pub year: Option<i32>,

    /// Snapshot: genre label at add time
    pub category: Option<String>,

    /// When the favorite was first added
    pub created_at: DateTime<Utc>,
}
