//! # Seatq REST
//!
//! REST API layer using Axum.
//! Exposes seat reservation, push notification, job lookup and health endpoints.

pub mod controllers;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod state;

pub use router::*;
pub use state::*;
