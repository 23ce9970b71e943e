// src/domain/mod.rs
//
// Domain Root - The Single Source of Truth for Domain API
//
// This file MUST declare all domain modules and re-export their public API.
// All other modules import from `crate::domain::*`

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod favorite;
pub mod movie;
pub mod rating;
pub mod validation;
pub mod watch_later;

// ============================================================================
// PUBLIC API RE-EXPORTS
// ============================================================================

// Movie Domain
pub use movie::{Movie, MovieSnapshot};

// Association Domains
pub use favorite::Favorite;
pub use rating::{Rating, TmdbRating};
pub use watch_later::WatchLaterEntry;

// Validation Primitives
pub use validation::{
    validate_bounded_f64, validate_bounded_i32, validate_max_len, validate_positive_id,
    validate_rating_value,
};
