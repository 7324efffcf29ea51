//! Reservation service implementation.

use crate::gate::ReservationGate;
use crate::jobs::ReserveSeat;
use crate::reservation_service::{ReservationService, ReservationStatus};
use async_trait::async_trait;
use seatq_core::SeatqResult;
use seatq_jobs::{JobError, JobQueue, JobQueueExt, JobResult, WorkerPool};
use seatq_store::{ReserveOutcome, SeatStore};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Failure reason when a reservation job finds no seat left.
pub const SOLD_OUT: &str = "Not enough seats available";

/// Reservation service backed by a seat store and a job queue.
pub struct ReservationServiceImpl {
    store: Arc<dyn SeatStore>,
    queue: Arc<dyn JobQueue>,
    pool: Arc<WorkerPool>,
    gate: ReservationGate,
    initial_seats: i64,
}

impl ReservationServiceImpl {
    /// Creates the service and registers the `reserve_seat` handler on `pool`.
    pub fn new(
        store: Arc<dyn SeatStore>,
        queue: Arc<dyn JobQueue>,
        pool: Arc<WorkerPool>,
        initial_seats: i64,
    ) -> Self {
        let gate = ReservationGate::new();

        let handler_store = Arc::clone(&store);
        let handler_gate = gate.clone();
        pool.register::<ReserveSeat, _, _>(move |_job, _ctx| {
            let store = Arc::clone(&handler_store);
            let gate = handler_gate.clone();
            async move { reserve_one(store.as_ref(), &gate).await }
        });

        Self {
            store,
            queue,
            pool,
            gate,
            initial_seats,
        }
    }

    /// The gate shared with the worker.
    #[must_use]
    pub fn gate(&self) -> &ReservationGate {
        &self.gate
    }
}

/// Takes one seat. This is the body of a `reserve_seat` job.
///
/// Closes the gate when no seat is left or when this call took the last one.
async fn reserve_one(store: &dyn SeatStore, gate: &ReservationGate) -> JobResult<()> {
    match store.reserve_seat().await? {
        ReserveOutcome::Reserved { remaining } => {
            debug!(remaining, "Seat reserved");
            if remaining == 0 && gate.close() {
                info!("Last seat reserved, reservations closed");
            }
            Ok(())
        }
        ReserveOutcome::SoldOut => {
            if gate.close() {
                info!("No seats left, reservations closed");
            }
            Err(JobError::rejected(SOLD_OUT))
        }
    }
}

#[async_trait]
impl ReservationService for ReservationServiceImpl {
    async fn initialize(&self) -> SeatqResult<()> {
        self.store.initialize(self.initial_seats).await
    }

    async fn available_seats(&self) -> SeatqResult<Option<i64>> {
        self.store.read().await
    }

    async fn request_reservation(&self) -> ReservationStatus {
        if !self.gate.is_open() {
            return ReservationStatus::Blocked;
        }

        match self.queue.enqueue(ReserveSeat).await {
            Ok(handle) => {
                debug!(job_id = %handle.id(), "Seat reservation job created");
                handle
                    .on_complete(|id| info!("Seat reservation job {} completed", id))
                    .on_failed(|id, err| info!("Seat reservation job {} failed: {}", id, err))
                    .watch();
                ReservationStatus::InProcess
            }
            Err(e) => {
                error!(error = %e, "Failed to create seat reservation job");
                ReservationStatus::Failed
            }
        }
    }

    fn start_processing(&self) -> bool {
        self.pool.spawn()
    }

    fn is_accepting(&self) -> bool {
        self.gate.is_open()
    }

    async fn check_ready(&self) -> SeatqResult<()> {
        self.store.ping().await?;
        self.queue.health_check().await?;
        Ok(())
    }
}
