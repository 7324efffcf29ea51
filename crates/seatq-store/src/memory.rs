//! In-process seat store.

use crate::{ReserveOutcome, SeatStore};
use async_trait::async_trait;
use parking_lot::Mutex;
use seatq_core::SeatqResult;
use tracing::debug;

/// Seat counter held in process memory.
///
/// Used when Redis is disabled and in tests. The counter starts unset,
/// like a fresh Redis key.
#[derive(Debug, Default)]
pub struct MemorySeatStore {
    seats: Mutex<Option<i64>>,
}

impl MemorySeatStore {
    /// Creates a store with an unset counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with the counter already set.
    #[must_use]
    pub fn with_seats(seats: i64) -> Self {
        Self {
            seats: Mutex::new(Some(seats)),
        }
    }
}

#[async_trait]
impl SeatStore for MemorySeatStore {
    async fn initialize(&self, seats: i64) -> SeatqResult<()> {
        *self.seats.lock() = Some(seats);
        debug!(seats, "Seat counter initialized in memory");
        Ok(())
    }

    async fn read(&self) -> SeatqResult<Option<i64>> {
        Ok(*self.seats.lock())
    }

    async fn write(&self, seats: i64) -> SeatqResult<()> {
        *self.seats.lock() = Some(seats);
        Ok(())
    }

    async fn reserve_seat(&self) -> SeatqResult<ReserveOutcome> {
        let mut seats = self.seats.lock();
        match *seats {
            Some(current) if current > 0 => {
                let remaining = current - 1;
                *seats = Some(remaining);
                Ok(ReserveOutcome::Reserved { remaining })
            }
            _ => Ok(ReserveOutcome::SoldOut),
        }
    }

    async fn ping(&self) -> SeatqResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_unset_counter() {
        let store = MemorySeatStore::new();
        assert_eq!(store.read().await.unwrap(), None);
        assert_eq!(store.reserve_seat().await.unwrap(), ReserveOutcome::SoldOut);
        assert_eq!(store.read().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_initialize_and_write() {
        let store = MemorySeatStore::new();
        store.initialize(50).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(50));

        store.write(7).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(7));
    }

    #[tokio::test]
    async fn test_reserve_decrements_until_zero() {
        let store = MemorySeatStore::with_seats(2);

        assert_eq!(
            store.reserve_seat().await.unwrap(),
            ReserveOutcome::Reserved { remaining: 1 }
        );
        assert_eq!(
            store.reserve_seat().await.unwrap(),
            ReserveOutcome::Reserved { remaining: 0 }
        );
        assert_eq!(store.reserve_seat().await.unwrap(), ReserveOutcome::SoldOut);
        assert_eq!(store.read().await.unwrap(), Some(0));
    }

    #[tokio::test]
    async fn test_negative_counter_is_sold_out() {
        let store = MemorySeatStore::with_seats(-3);
        assert_eq!(store.reserve_seat().await.unwrap(), ReserveOutcome::SoldOut);
        assert_eq!(store.read().await.unwrap(), Some(-3));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reservations_never_oversell() {
        let store = Arc::new(MemorySeatStore::with_seats(10));

        let attempts = (0..40).map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.reserve_seat().await.unwrap() })
        });
        let outcomes = futures::future::join_all(attempts).await;

        let reserved = outcomes
            .into_iter()
            .map(|r| r.unwrap())
            .filter(ReserveOutcome::is_reserved)
            .count();
        assert_eq!(reserved, 10);
        assert_eq!(store.read().await.unwrap(), Some(0));
    }
}
