//! REST API controllers.

pub mod health_controller;
pub mod jobs_controller;
pub mod notifications_controller;
pub mod seats_controller;
