//! # Seatq Store
//!
//! The persisted seat counter. `RedisSeatStore` talks to Redis through a
//! `deadpool-redis` pool; `MemorySeatStore` keeps the counter in process
//! memory for tests and Redis-less runs.

mod memory;
mod redis_store;
mod store;

pub use memory::MemorySeatStore;
pub use redis_store::{create_pool, RedisSeatStore};
pub use store::{ReserveOutcome, SeatStore};

pub use deadpool_redis::Pool;
