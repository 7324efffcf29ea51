//! Reservation gate.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared switch deciding whether new reservation requests are accepted.
///
/// Starts open. Once closed it stays closed for the life of the process.
/// Clones share the same flag.
#[derive(Debug, Clone)]
pub struct ReservationGate(Arc<AtomicBool>);

impl ReservationGate {
    /// Creates an open gate.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    /// Returns true while reservations are accepted.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Stops accepting reservations. Returns true if this call closed it.
    pub fn close(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

impl Default for ReservationGate {
    fn default() -> Self {
        Self::new()
    }
}
