// src/error/types.rs
//
// Error taxonomy for the catalog core.
//
// Four categories, one per caller-visible outcome:
// - Validation -> bad input, rejected before any store access
// - NotFound   -> strict operation against an absent record
// - Conflict   -> strict operation against an already-present record
// - OperationFailed -> the store misbehaved; detail is logged, never leaked

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Operation failed")]
    OperationFailed,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        AppError::Conflict(message.into())
    }

    /// Log a store-level failure with full detail and degrade it to the
    /// generic category. Raw driver text must never reach a caller.
    pub fn storage(context: &str, err: rusqlite::Error) -> Self {
        log::error!("storage failure during {}: {}", context, err);
        AppError::OperationFailed
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<r2d2::Error> for AppError {
    fn from(err: r2d2::Error) -> Self {
        log::error!("connection pool error: {}", err);
        AppError::OperationFailed
    }
}

pub type AppResult<T> = Result<T, AppError>;
