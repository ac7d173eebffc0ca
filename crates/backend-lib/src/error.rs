// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::validation::ValidationError;

/// Application error types, one variant per failure kind the API can report
#[derive(Error, Debug)]
pub enum AppError {
    /// Required field missing or payload malformed
    #[error("{0}")]
    BadRequest(String),

    /// Semantic field violation (username length, instructions length, ...)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No active session where one is required
    #[error("Unauthorized")]
    Unauthorized,

    /// Login failed. One generic message for both unknown-username and
    /// wrong-password so callers cannot enumerate accounts.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Uniqueness violation at the persistence boundary
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // duplicate usernames surface as 422 alongside field validation
            // failures; clients treat both as "fix your input"
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get a message safe to hand to clients. Client errors keep their
    /// detail; server-side failures are collapsed so no internals leak.
    pub fn sanitized_message(&self) -> String {
        match self {
            AppError::Internal(_) | AppError::Io(_) | AppError::Json(_) => {
                "Internal server error".to_string()
            },
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Use detailed messages in development, sanitized in production
        let message = if cfg!(debug_assertions) {
            self.to_string()
        } else {
            self.sanitized_message()
        };

        let body = serde_json::json!({ "error": message });

        (status, axum::Json(body)).into_response()
    }
}
