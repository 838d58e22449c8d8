//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use crate::state::PersistenceError;
use crate::validation::{ApiKeyError, ValidationErrors};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Agent with the given ID was not found
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    /// User input failed validation
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    /// API key rejected by the provider format check
    #[error("{0}")]
    InvalidApiKey(#[from] ApiKeyError),

    /// Error occurred during state persistence
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::AgentNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidApiKey(_) => StatusCode::BAD_REQUEST,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = match &self {
            AppError::Validation(errors) => json!({
                "error": self.to_string(),
                "status": status.as_u16(),
                "fields": errors.fields,
            }),
            _ => json!({
                "error": self.to_string(),
                "status": status.as_u16(),
            }),
        };

        (status, Json(body)).into_response()
    }
}
