//! Seat store interface.

use async_trait::async_trait;
use seatq_core::SeatqResult;
use serde::Serialize;
use shaku::Interface;

/// Result of an attempt to take one seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReserveOutcome {
    /// A seat was taken; `remaining` is the counter after the decrement.
    Reserved { remaining: i64 },
    /// No seat was left. The counter is unchanged.
    SoldOut,
}

impl ReserveOutcome {
    /// Returns true if a seat was taken.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        matches!(self, Self::Reserved { .. })
    }
}

/// Access to the persisted seat counter.
///
/// Every call goes to the backing store. Nothing is cached and transport
/// failures are returned as `SeatqError::Store` without retrying.
#[async_trait]
pub trait SeatStore: Interface + Send + Sync {
    /// Overwrites the counter with the starting seat count.
    async fn initialize(&self, seats: i64) -> SeatqResult<()>;

    /// Reads the counter. `None` if it was never set.
    async fn read(&self) -> SeatqResult<Option<i64>>;

    /// Overwrites the counter.
    async fn write(&self, seats: i64) -> SeatqResult<()>;

    /// Takes one seat if any is left.
    ///
    /// The read and the decrement happen as one operation on the store, so
    /// concurrent callers can never take more seats than the counter held.
    /// A missing or non-numeric counter is treated as sold out.
    async fn reserve_seat(&self) -> SeatqResult<ReserveOutcome>;

    /// Checks that the store answers.
    async fn ping(&self) -> SeatqResult<()>;
}
