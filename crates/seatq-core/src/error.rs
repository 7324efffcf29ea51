//! Unified error type shared by the seatq crates.

use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for seatq.
///
/// Infrastructure failures (store, queue) carry the transport message so
/// callers can log it; the HTTP layer maps each variant to a status code.
#[derive(Error, Debug)]
pub enum SeatqError {
    /// Resource not found
    #[error("Resource not found: {resource_type} with id {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Key-value store error (transport or decoding)
    #[error("Store error: {0}")]
    Store(String),

    /// Job queue error
    #[error("Queue error: {0}")]
    Queue(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A dependency is not reachable
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SeatqError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Unavailable(_) => 503,
            Self::Store(_) | Self::Queue(_) => 502,
            Self::Configuration(_) | Self::Internal(_) | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Store(_) => "STORE_ERROR",
            Self::Queue(_) => "QUEUE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Unavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for a resource.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: &'static str, id: T) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a store error.
    #[must_use]
    pub fn store<T: Into<String>>(message: T) -> Self {
        Self::Store(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }
}

impl From<serde_json::Error> for SeatqError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(SeatqError::not_found("Job", 1).status_code(), 404);
        assert_eq!(SeatqError::validation("bad body").status_code(), 400);
        assert_eq!(SeatqError::store("connection refused").status_code(), 502);
        assert_eq!(SeatqError::Queue("save failed".into()).status_code(), 502);
        assert_eq!(SeatqError::Unavailable("redis".into()).status_code(), 503);
        assert_eq!(SeatqError::internal("oops").status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(SeatqError::not_found("Job", "abc").error_code(), "NOT_FOUND");
        assert_eq!(SeatqError::store("x").error_code(), "STORE_ERROR");
        assert_eq!(SeatqError::Configuration("x".into()).error_code(), "CONFIGURATION_ERROR");
        assert_eq!(SeatqError::internal("x").error_code(), "INTERNAL_ERROR");
    }

    #[test]
    fn test_error_display() {
        let err = SeatqError::not_found("Job", "42");
        assert!(err.to_string().contains("Job"));
        assert!(err.to_string().contains("42"));

        let err = SeatqError::store("connection reset");
        assert_eq!(err.to_string(), "Store error: connection reset");
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("not-a-number").unwrap_err();
        let err = SeatqError::from(json_err);
        assert!(matches!(err, SeatqError::Internal(_)));
    }

    #[test]
    fn test_from_anyhow() {
        let err: SeatqError = anyhow::anyhow!("boom").into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_string(), "boom");
    }
}
