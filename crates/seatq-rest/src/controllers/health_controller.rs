//! Health check controller.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use seatq_jobs::{Job, QueueStats};
use seatq_service::{PushNotification, ReserveSeat};
use serde::Serialize;
use tracing::warn;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status.
    pub status: String,
    /// Application version.
    pub version: String,
}

/// Readiness response.
#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: String,
    /// Whether `/reserve_seat` still accepts requests.
    pub accepting_reservations: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub queues: Vec<QueueStats>,
}

/// Creates the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
}

/// Health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness check endpoint. 503 when the store or the queue does not answer.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let accepting_reservations = state.reservations.is_accepting();

    if let Err(e) = state.reservations.check_ready().await {
        warn!(error = %e, "Readiness check failed");
        let body = ReadyResponse {
            status: e.to_string(),
            accepting_reservations,
            queues: Vec::new(),
        };
        return (StatusCode::SERVICE_UNAVAILABLE, Json(body));
    }

    let mut queues = Vec::new();
    for queue in [ReserveSeat::QUEUE, PushNotification::QUEUE] {
        match state.jobs.queue_length(queue).await {
            Ok(pending) => queues.push(QueueStats {
                queue: queue.to_string(),
                pending,
            }),
            Err(e) => warn!(queue, error = %e, "Failed to read queue length"),
        }
    }

    let body = ReadyResponse {
        status: "ready".to_string(),
        accepting_reservations,
        queues,
    };
    (StatusCode::OK, Json(body))
}
