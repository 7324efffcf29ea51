//! Application wiring.

use axum::Router;
use seatq_config::AppConfig;
use seatq_core::{SeatqError, SeatqResult};
use seatq_jobs::{
    Job, JobEvents, JobQueue, MemoryJobQueue, RedisJobQueue, Retention, WorkerPool,
    WorkerPoolConfig,
};
use seatq_rest::{create_router, AppState};
use seatq_service::{
    NotificationService, NotificationServiceImpl, PushNotification, ReservationService,
    ReservationServiceImpl, ReserveSeat,
};
use seatq_store::{create_pool, MemorySeatStore, RedisSeatStore, SeatStore};
use std::future::Future;
use std::sync::Arc;
use tracing::info;

/// Fully wired application.
pub struct Application {
    config: AppConfig,
    reservations: Arc<ReservationServiceImpl>,
    notifications: Arc<NotificationServiceImpl>,
    queue: Arc<dyn JobQueue>,
    reservation_pool: Arc<WorkerPool>,
    notification_pool: Arc<WorkerPool>,
}

impl Application {
    /// Connects the backends and builds the services.
    ///
    /// With `redis.enabled = false` seats and jobs live in process memory.
    pub async fn build(config: AppConfig) -> SeatqResult<Self> {
        let events = JobEvents::new();
        let retention = Retention::from(&config.jobs);

        let (store, queue): (Arc<dyn SeatStore>, Arc<dyn JobQueue>) = if config.redis.enabled {
            let pool = Arc::new(create_pool(&config.redis).await?);
            info!(url = %config.redis.url, "Using Redis backends");
            (
                Arc::new(RedisSeatStore::new(Arc::clone(&pool), config.seats.key.clone())),
                Arc::new(
                    RedisJobQueue::new(pool, &config.redis.key_prefix, events)
                        .with_retention(retention),
                ),
            )
        } else {
            info!("Redis disabled, using in-memory backends");
            (
                Arc::new(MemorySeatStore::new()),
                Arc::new(MemoryJobQueue::new(events).with_retention(retention)),
            )
        };

        let reservation_pool = Arc::new(WorkerPool::new(
            Arc::clone(&queue),
            WorkerPoolConfig::from(&config.jobs.reservations).queue(ReserveSeat::QUEUE),
        ));
        let notification_pool = Arc::new(WorkerPool::new(
            Arc::clone(&queue),
            WorkerPoolConfig::from(&config.jobs.notifications).queue(PushNotification::QUEUE),
        ));

        let reservations = Arc::new(ReservationServiceImpl::new(
            store,
            Arc::clone(&queue),
            Arc::clone(&reservation_pool),
            config.seats.initial,
        ));
        let notifications = Arc::new(NotificationServiceImpl::new(
            Arc::clone(&queue),
            Arc::clone(&notification_pool),
            config.notifications.blacklist.clone(),
        ));

        Ok(Self {
            config,
            reservations,
            notifications,
            queue,
            reservation_pool,
            notification_pool,
        })
    }

    /// Writes the starting seat count and starts the pools that run at boot.
    ///
    /// Reservation workers wait for `/process`.
    pub async fn start(&self) -> SeatqResult<()> {
        self.reservations.initialize().await?;
        info!(seats = self.config.seats.initial, "Seat counter initialized");

        if self.config.notifications.process_on_start && self.notifications.start_processing() {
            info!("Notification workers started");
        }

        Ok(())
    }

    /// HTTP router bound to this application's services.
    pub fn router(&self) -> Router {
        let state = AppState::new(
            self.reservations.clone(),
            self.notifications.clone(),
            Arc::clone(&self.queue),
        );
        create_router(state, &self.config.server)
    }

    /// Serves HTTP until `shutdown` resolves, then stops the worker pools.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> SeatqResult<()> {
        let addr = self.config.server.addr();
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| SeatqError::Internal(format!("Failed to bind {}: {}", addr, e)))?;

        info!("Starting REST server on http://{}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| SeatqError::Internal(format!("REST server error: {}", e)))?;

        self.shutdown().await;
        Ok(())
    }

    /// Stops both worker pools and waits for in-flight jobs.
    pub async fn shutdown(&self) {
        tokio::join!(
            self.reservation_pool.shutdown(),
            self.notification_pool.shutdown()
        );
        info!(
            reservations_processed = self.reservation_pool.jobs_processed(),
            notifications_processed = self.notification_pool.jobs_processed(),
            "Worker pools stopped"
        );
    }

    /// The configuration this application was built with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
