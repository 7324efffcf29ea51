//! Redis-backed seat store.

use crate::{ReserveOutcome, SeatStore};
use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Config, Pool, Runtime};
use redis::Script;
use seatq_config::RedisConfig;
use seatq_core::{SeatqError, SeatqResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Takes one seat if the counter is a positive number.
///
/// Returns `{1, remaining}` on success and `{0, current}` when sold out.
/// A missing or non-numeric value reads as 0.
const RESERVE_SCRIPT: &str = r"
local current = tonumber(redis.call('GET', KEYS[1]))
if current == nil or current <= 0 then
    return {0, current or 0}
end
return {1, redis.call('DECR', KEYS[1])}
";

/// Create a Redis connection pool and check that the server answers.
pub async fn create_pool(config: &RedisConfig) -> SeatqResult<Pool> {
    info!("Creating Redis connection pool...");

    let cfg = Config::from_url(&config.url);

    let pool = cfg
        .builder()
        .map_err(|e| SeatqError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| SeatqError::Configuration(format!("Failed to create pool: {}", e)))?;

    let mut conn = pool
        .get()
        .await
        .map_err(|e| SeatqError::Unavailable(format!("Failed to connect to Redis: {}", e)))?;
    redis::cmd("PING")
        .query_async::<String>(&mut *conn)
        .await
        .map_err(|e| SeatqError::Unavailable(format!("Redis did not answer PING: {}", e)))?;

    info!("Redis connection pool created successfully");

    Ok(pool)
}

/// Seat counter stored as a plain integer string under one Redis key.
pub struct RedisSeatStore {
    pool: Arc<Pool>,
    key: String,
    reserve: Script,
}

impl RedisSeatStore {
    /// Creates a store for the counter at `key`.
    #[must_use]
    pub fn new(pool: Arc<Pool>, key: impl Into<String>) -> Self {
        Self {
            pool,
            key: key.into(),
            reserve: Script::new(RESERVE_SCRIPT),
        }
    }

    /// The key holding the counter.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    async fn get_conn(&self) -> SeatqResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| SeatqError::Store(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl SeatStore for RedisSeatStore {
    async fn initialize(&self, seats: i64) -> SeatqResult<()> {
        self.write(seats).await?;
        info!(key = %self.key, seats, "Seat counter initialized");
        Ok(())
    }

    async fn read(&self) -> SeatqResult<Option<i64>> {
        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(&self.key).await.map_err(|e| {
            SeatqError::Store(format!("Failed to get key '{}': {}", self.key, e))
        })?;

        value
            .map(|raw| {
                raw.trim().parse::<i64>().map_err(|_| {
                    SeatqError::Store(format!(
                        "Key '{}' holds a non-integer value: {}",
                        self.key, raw
                    ))
                })
            })
            .transpose()
    }

    async fn write(&self, seats: i64) -> SeatqResult<()> {
        let mut conn = self.get_conn().await?;
        conn.set::<_, _, ()>(&self.key, seats).await.map_err(|e| {
            SeatqError::Store(format!("Failed to set key '{}': {}", self.key, e))
        })?;

        debug!(key = %self.key, seats, "Seat counter written");
        Ok(())
    }

    async fn reserve_seat(&self) -> SeatqResult<ReserveOutcome> {
        let mut conn = self.get_conn().await?;
        let (taken, value): (i64, i64) = self
            .reserve
            .key(&self.key)
            .invoke_async(&mut *conn)
            .await
            .map_err(|e| SeatqError::Store(format!("Failed to reserve seat: {}", e)))?;

        let outcome = if taken == 1 {
            ReserveOutcome::Reserved { remaining: value }
        } else {
            ReserveOutcome::SoldOut
        };
        debug!(key = %self.key, ?outcome, "Seat reservation attempted");
        Ok(outcome)
    }

    async fn ping(&self) -> SeatqResult<()> {
        let mut conn = self.get_conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map_err(|e| SeatqError::Store(format!("Redis PING failed: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_checks_before_decrement() {
        let get = RESERVE_SCRIPT.find("GET").unwrap();
        let decr = RESERVE_SCRIPT.find("DECR").unwrap();
        assert!(get < decr);
        assert!(RESERVE_SCRIPT.contains("current <= 0"));
    }

    #[tokio::test]
    async fn test_create_pool_rejects_bad_url() {
        let config = RedisConfig {
            url: "not-a-redis-url".to_string(),
            ..RedisConfig::default()
        };
        assert!(create_pool(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_store_reports_unreachable_redis() {
        let pool = Config::from_url("redis://127.0.0.1:1")
            .create_pool(Some(Runtime::Tokio1))
            .unwrap();
        let store = RedisSeatStore::new(Arc::new(pool), "available_seats");

        assert_eq!(store.key(), "available_seats");
        let err = store.read().await.unwrap_err();
        assert!(matches!(err, SeatqError::Store(_)));
    }

    // The tests below run the reservation script against a Redis server.
    // Run them with `cargo test -- --ignored`, pointing SEATQ_TEST_REDIS_URL
    // at the server.

    fn live_store() -> RedisSeatStore {
        let url = std::env::var("SEATQ_TEST_REDIS_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let pool = Config::from_url(url)
            .create_pool(Some(Runtime::Tokio1))
            .unwrap();
        let key = format!("seatq-test:available_seats:{}", uuid::Uuid::new_v4());
        RedisSeatStore::new(Arc::new(pool), key)
    }

    async fn remove_key(store: &RedisSeatStore) {
        let mut conn = store.get_conn().await.unwrap();
        conn.del::<_, ()>(store.key()).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn test_live_initialize_read_write() {
        let store = live_store();
        assert_eq!(store.read().await.unwrap(), None);

        store.initialize(50).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(50));

        store.write(3).await.unwrap();
        assert_eq!(store.read().await.unwrap(), Some(3));
        remove_key(&store).await;
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn test_live_last_seat_then_sold_out() {
        let store = live_store();
        store.initialize(1).await.unwrap();

        assert_eq!(
            store.reserve_seat().await.unwrap(),
            ReserveOutcome::Reserved { remaining: 0 }
        );
        assert_eq!(store.reserve_seat().await.unwrap(), ReserveOutcome::SoldOut);
        assert_eq!(store.read().await.unwrap(), Some(0));
        remove_key(&store).await;
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn test_live_unset_counter_is_sold_out() {
        let store = live_store();

        assert_eq!(store.reserve_seat().await.unwrap(), ReserveOutcome::SoldOut);
        assert_eq!(store.read().await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "requires a running Redis server"]
    async fn test_live_concurrent_reservations_never_oversell() {
        let store = Arc::new(live_store());
        store.initialize(5).await.unwrap();

        let attempts = (0..40).map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.reserve_seat().await.unwrap() })
        });
        let outcomes = futures::future::join_all(attempts).await;

        let reserved = outcomes
            .into_iter()
            .map(Result::unwrap)
            .filter(|outcome| matches!(outcome, ReserveOutcome::Reserved { .. }))
            .count();
        assert_eq!(reserved, 5);
        assert_eq!(store.read().await.unwrap(), Some(0));
        remove_key(&store).await;
    }
}
