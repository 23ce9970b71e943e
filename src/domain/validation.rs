// src/domain/validation.rs
//
// Shared validation primitives
//
// These are the absolute rules enforced at the boundary, before any
// store access. Both the filter builder and the repositories call them;
// a failed check never leaves partial state behind.

use crate::error::{AppError, AppResult};

/// Score bounds for catalog movies
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

/// Rating bounds for user ratings
pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 10.0;

/// Year bounds: earliest plausible film year through a forward-looking cap
pub const YEAR_MIN: i32 = 1888;
pub const YEAR_MAX: i32 = 2100;

/// Free-text search cap
pub const SEARCH_TEXT_MAX: usize = 500;

/// Director name cap
pub const DIRECTOR_NAME_MAX: usize = 255;

/// Review text cap
pub const REVIEW_MAX: usize = 2000;

/// Guard against unbounded result sets
pub const QUERY_LIMIT_MAX: u32 = 10_000;

/// Page-size cap for paginated rating listings
pub const RATINGS_PAGE_MAX: u32 = 1000;

/// Page-size cap for watched-history listings
pub const HISTORY_PAGE_MAX: u32 = 1000;

/// IDs (user_id, movie_id, tmdb_id) must be positive
pub fn validate_positive_id(field: &str, value: i64) -> AppResult<()> {
    if value <= 0 {
        return Err(AppError::validation(format!(
            "{} must be a positive integer",
            field
        )));
    }
    Ok(())
}

/// Rating values must lie in [1.0, 10.0]
pub fn validate_rating_value(rating: f64) -> AppResult<()> {
    if !rating.is_finite() || rating < RATING_MIN || rating > RATING_MAX {
        return Err(AppError::validation("Rating must be between 1 and 10"));
    }
    Ok(())
}

/// A bounded float, used for score filter bounds
pub fn validate_bounded_f64(field: &str, value: f64, min: f64, max: f64) -> AppResult<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(AppError::validation(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }
    Ok(())
}

/// A bounded integer, used for year filter bounds
pub fn validate_bounded_i32(field: &str, value: i32, min: i32, max: i32) -> AppResult<()> {
    if value < min || value > max {
        return Err(AppError::validation(format!(
            "{} must be between {} and {}",
            field, min, max
        )));
    }
    Ok(())
}

/// Text length cap; counts characters, not bytes
pub fn validate_max_len(field: &str, text: &str, max: usize) -> AppResult<()> {
    if text.chars().count() > max {
        return Err(AppError::validation(format!(
            "{} must not exceed {} characters",
            field, max
        )));
    }
    Ok(())
}
