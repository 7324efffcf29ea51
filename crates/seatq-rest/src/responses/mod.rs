//! API response types.
//!
//! Every user-visible answer that is not a data payload is a JSON object
//! with a single `status` string.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use seatq_core::SeatqError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// `{"status": "..."}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

/// Application error type for Axum.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    /// Creates an error with an explicit status code and message.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// HTTP status code of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Text placed in the `status` field.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<SeatqError> for AppError {
    fn from(err: SeatqError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match err {
            SeatqError::Validation(message) => message,
            SeatqError::NotFound { resource_type, .. } => format!("{} not found", resource_type),
            other => {
                error!(error = %other, code = other.error_code(), "Request failed");
                other.to_string()
            }
        };

        Self { status, message }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status, Json(StatusResponse::new(self.message))).into_response()
    }
}

/// Result type for Axum handlers.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Helper to create a `{"status": ...}` success response.
pub fn status(message: impl Into<String>) -> Json<StatusResponse> {
    Json(StatusResponse::new(message))
}
