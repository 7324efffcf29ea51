//! Service implementations.
//!
//! Trait definitions live in the parent module (e.g. `reservation_service.rs`).

pub mod notification_service_impl;
pub mod reservation_service_impl;

pub use notification_service_impl::NotificationServiceImpl;
pub use reservation_service_impl::ReservationServiceImpl;
