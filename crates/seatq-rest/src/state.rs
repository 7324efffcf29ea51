//! Application state for Axum handlers.

use seatq_jobs::JobQueue;
use seatq_service::{NotificationService, ReservationService};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub reservations: Arc<dyn ReservationService>,
    pub notifications: Arc<dyn NotificationService>,
    pub jobs: Arc<dyn JobQueue>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        reservations: Arc<dyn ReservationService>,
        notifications: Arc<dyn NotificationService>,
        jobs: Arc<dyn JobQueue>,
    ) -> Self {
        Self {
            reservations,
            notifications,
            jobs,
        }
    }
}
