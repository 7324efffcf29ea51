//! # Seatq Service
//!
//! Seat reservation and push notification use cases on top of the seat
//! store and the job queue.

mod gate;
pub mod jobs;
mod notification_service;
mod reservation_service;

pub mod r#impl;

pub use gate::ReservationGate;
pub use jobs::{PushNotification, ReserveSeat};
pub use notification_service::*;
pub use r#impl::{NotificationServiceImpl, ReservationServiceImpl};
pub use reservation_service::*;
