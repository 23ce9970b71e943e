// src/error/response.rs
//
// Caller-facing error envelope.
//
// ARCHITECTURE:
// - Maps internal errors -> category + HTTP status for JSON callers
// - Consistent error format, no string matching required downstream
// - Never exposes internal implementation details

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Error categories the HTTP layer branches on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Invalid input (400)
    Validation,

    /// Resource not found (404)
    NotFound,

    /// Duplicate / precondition violated (409)
    Conflict,

    /// Store or infrastructure failure (500)
    Internal,
}

impl ErrorKind {
    pub fn http_status(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }
}

/// Standard error response for API callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorResponse {
    pub fn kind_of(error: &AppError) -> ErrorKind {
        match error {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::OperationFailed => ErrorKind::Internal,
        }
    }

    pub fn from_app_error(error: &AppError) -> Self {
        Self {
            success: false,
            kind: Self::kind_of(error),
            message: error.to_string(),
        }
    }

    /// Serialize for the HTTP layer; falls back to a bare failure
    /// envelope if encoding itself fails
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"success":false,"kind":"internal","message":"Operation failed"}"#.to_string())
    }
}
