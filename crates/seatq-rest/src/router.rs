//! Main application router.

use crate::{
    controllers::{health_controller, jobs_controller, notifications_controller, seats_controller},
    middleware::logging_middleware,
    state::AppState,
};
use axum::{middleware, Router};
use seatq_config::ServerConfig;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Creates the main application router.
pub fn create_router(state: AppState, server_config: &ServerConfig) -> Router {
    let cors = create_cors_layer(server_config);

    let router = Router::new()
        .merge(seats_controller::router())
        .merge(notifications_controller::router())
        .merge(jobs_controller::router())
        .merge(health_controller::router())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware));

    info!("Router created");
    router
}

/// Creates a CORS layer based on server configuration.
fn create_cors_layer(server_config: &ServerConfig) -> CorsLayer {
    if server_config.cors_enabled {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    }
}
