//! # Seatq Core
//!
//! Error types, result aliases and logging setup shared by every seatq crate.

pub mod error;
pub mod result;
pub mod telemetry;

pub use error::*;
pub use result::*;
pub use telemetry::*;

// Re-export shaku so service seams can be declared as `Interface`s.
pub use shaku::Interface;
