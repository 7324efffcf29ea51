//! # Seatq Server Library
//!
//! Wires configuration, storage backends, worker pools and the HTTP router
//! into a runnable application.

pub mod app;
pub mod startup;
