//! Seat reservation controller.

use crate::responses::{status, ApiResult, StatusResponse};
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Available seats response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSeatsResponse {
    /// `null` until the counter is initialised.
    pub number_of_available_seats: Option<i64>,
}

/// Creates the seats router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/available_seats", get(available_seats))
        .route("/reserve_seat", get(reserve_seat))
        .route("/process", get(process))
}

/// Current seat count.
pub async fn available_seats(State(state): State<AppState>) -> ApiResult<AvailableSeatsResponse> {
    let seats = state.reservations.available_seats().await?;
    Ok(Json(AvailableSeatsResponse {
        number_of_available_seats: seats,
    }))
}

/// Requests one seat. The seat is taken later by the reservation worker.
pub async fn reserve_seat(State(state): State<AppState>) -> Json<StatusResponse> {
    let outcome = state.reservations.request_reservation().await;
    status(outcome.message())
}

/// Starts the reservation worker pool.
pub async fn process(State(state): State<AppState>) -> Json<StatusResponse> {
    if !state.reservations.start_processing() {
        debug!("Reservation workers already running");
    }
    status("Queue processing")
}
