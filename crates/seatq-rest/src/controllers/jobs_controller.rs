//! Job lookup controller.

use crate::responses::ApiResult;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use seatq_core::SeatqError;
use seatq_jobs::{JobId, JobInfo};

/// Creates the jobs router.
pub fn router() -> Router<AppState> {
    Router::new().route("/jobs/:job_id", get(get_job))
}

/// Returns the stored record of a job so clients can poll its outcome.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<JobInfo> {
    let job_id = JobId::from_string(job_id);

    state
        .jobs
        .get_job(&job_id)
        .await
        .map_err(SeatqError::from)?
        .map(Json)
        .ok_or_else(|| SeatqError::not_found("Job", job_id).into())
}
