//! Push notification controller.

use crate::responses::{AppError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use seatq_core::SeatqError;
use seatq_jobs::JobId;
use seatq_service::parse_notification_jobs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

/// Response for a created batch of notification jobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationJobsResponse {
    pub status: String,
    /// Job IDs in request order.
    pub jobs: Vec<JobId>,
}

/// Creates the notifications router.
pub fn router() -> Router<AppState> {
    Router::new().route("/notifications", post(create_notification_jobs))
}

/// Enqueues one `push_notification_code` job per array entry.
pub async fn create_notification_jobs(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<NotificationJobsResponse> {
    let Json(body) =
        body.map_err(|rejection| AppError::new(rejection.status(), rejection.body_text()))?;
    let jobs = parse_notification_jobs(body)?;

    let ids = state
        .notifications
        .create_jobs(jobs)
        .await
        .map_err(|e: SeatqError| {
            error!(error = %e, "Failed to create notification jobs");
            AppError::new(StatusCode::INTERNAL_SERVER_ERROR, "Notification jobs failed")
        })?;

    Ok(Json(NotificationJobsResponse {
        status: "Notification jobs created".to_string(),
        jobs: ids,
    }))
}
