//! Result type aliases for seatq.

use crate::SeatqError;

/// A specialized `Result` type for seatq operations.
pub type SeatqResult<T> = Result<T, SeatqError>;
