// src/domain/watch_later.rs
//
// Watch-Later Association
//
// Lifecycle: created unwatched -> may transition to watched (stamps
// watched_at) -> watched entries may be bulk-cleared.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An entry in a user's watch-later queue
///
/// Snapshot fields are optional: mark-watched may create the row
/// implicitly before any snapshot was captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchLaterEntry {
    /// Internal identifier
    pub id: i64,

    pub user_id: i64,

    pub movie_id: i64,

    /// Snapshot: movie title at add time
    pub title: Option<String>,

    /// Snapshot: poster URL at add time
    pub poster_url: Option<String>,

    /// Snapshot: release year at add time
    pub year: Option<i32>,

    /// Snapshot: genre label at add time
    pub category: Option<String>,

    /// Whether the user has watched this entry
    pub watched: bool,

    /// When the entry was marked watched
    pub watched_at: Option<DateTime<Utc>>,

    /// When the entry was added to the queue
    pub created_at: DateTime<Utc>,
}
