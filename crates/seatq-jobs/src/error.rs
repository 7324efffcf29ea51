//! Job error types.

use seatq_core::SeatqError;
use thiserror::Error;

/// Result type for job operations.
pub type JobResult<T> = Result<T, JobError>;

/// Job-related errors.
#[derive(Debug, Error)]
pub enum JobError {
    /// The handler refused the job. The message is the user-facing reason.
    #[error("{0}")]
    Rejected(String),

    /// Job execution failed.
    #[error("Job execution failed: {0}")]
    ExecutionFailed(String),

    /// Job timed out.
    #[error("Job timed out after {0} seconds")]
    Timeout(u64),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Redis pool error.
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),

    /// Job not found.
    #[error("Job not found: {0}")]
    NotFound(String),

    /// Worker error.
    #[error("Worker error: {0}")]
    Worker(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JobError {
    /// Creates a rejection with the given reason.
    pub fn rejected(reason: impl Into<String>) -> Self {
        JobError::Rejected(reason.into())
    }

    /// Returns true if the queue backend could not be reached.
    pub fn is_transport(&self) -> bool {
        matches!(self, JobError::Redis(_) | JobError::Pool(_))
    }
}

impl From<SeatqError> for JobError {
    fn from(err: SeatqError) -> Self {
        JobError::ExecutionFailed(err.to_string())
    }
}

impl From<JobError> for SeatqError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(id) => SeatqError::not_found("Job", id),
            JobError::Serialization(e) => SeatqError::Internal(e.to_string()),
            JobError::Configuration(msg) => SeatqError::Configuration(msg),
            other => SeatqError::Queue(other.to_string()),
        }
    }
}
