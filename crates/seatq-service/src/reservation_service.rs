//! Reservation service trait definition.

use async_trait::async_trait;
use seatq_core::{Interface, SeatqResult};
use std::fmt;

/// Answer to a reservation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationStatus {
    /// The gate is closed; nothing was enqueued.
    Blocked,
    /// A reservation job was enqueued.
    InProcess,
    /// The reservation job could not be saved.
    Failed,
}

impl ReservationStatus {
    /// Status text returned to clients.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Blocked => "Reservation are blocked",
            Self::InProcess => "Reservation in process",
            Self::Failed => "Reservation failed",
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Seat reservation service trait.
#[async_trait]
pub trait ReservationService: Interface + Send + Sync {
    /// Writes the starting seat count to the store.
    async fn initialize(&self) -> SeatqResult<()>;

    /// Reads the current seat count. `None` if it was never set.
    async fn available_seats(&self) -> SeatqResult<Option<i64>>;

    /// Enqueues a reservation job if the gate is open.
    async fn request_reservation(&self) -> ReservationStatus;

    /// Starts the reservation worker pool. Returns false if it was already running.
    fn start_processing(&self) -> bool;

    /// Returns true while reservations are accepted.
    fn is_accepting(&self) -> bool;

    /// Checks that the seat store and the job queue answer.
    async fn check_ready(&self) -> SeatqResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(ReservationStatus::Blocked.message(), "Reservation are blocked");
        assert_eq!(ReservationStatus::InProcess.to_string(), "Reservation in process");
        assert_eq!(ReservationStatus::Failed.message(), "Reservation failed");
    }
}
