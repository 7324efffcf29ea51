//! Application configuration structures.

use seatq_core::TelemetryConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application name and metadata.
    #[serde(default)]
    pub app: AppMetadata,

    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Redis configuration.
    #[serde(default)]
    pub redis: RedisConfig,

    /// Seat counter configuration.
    #[serde(default)]
    pub seats: SeatsConfig,

    /// Job queue and worker configuration.
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Push notification configuration.
    #[serde(default)]
    pub notifications: NotificationsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: TelemetryConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppMetadata {
    /// Application name.
    pub name: String,
    /// Application version.
    pub version: String,
    /// Environment (development, staging, production).
    pub environment: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "seatq".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "development".to_string(),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Enable CORS.
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 1245,
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Returns the bind address.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Redis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Redis URL.
    pub url: String,
    /// Connection pool size.
    pub pool_size: usize,
    /// Enable Redis. When disabled, seats and jobs live in process memory.
    pub enabled: bool,
    /// Key prefix for job queue keys.
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            pool_size: 10,
            enabled: true,
            key_prefix: "seatq:jobs".to_string(),
        }
    }
}

/// Seat counter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatsConfig {
    /// Store key holding the counter.
    pub key: String,
    /// Value written to the counter at startup.
    pub initial: i64,
}

impl Default for SeatsConfig {
    fn default() -> Self {
        Self {
            key: "available_seats".to_string(),
            initial: 50,
        }
    }
}

/// Job queue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobsConfig {
    /// Finished jobs kept per queue before the oldest are dropped.
    pub keep_finished: usize,
    /// Seconds a finished job record is kept.
    pub retention_secs: u64,
    /// Worker pool for seat reservations.
    pub reservations: WorkerConfig,
    /// Worker pool for push notifications.
    pub notifications: WorkerConfig,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            keep_finished: 1000,
            retention_secs: 86_400,
            reservations: WorkerConfig::with_concurrency(1),
            notifications: WorkerConfig::with_concurrency(2),
        }
    }
}

impl JobsConfig {
    /// Returns the finished job retention as Duration.
    #[must_use]
    pub const fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }
}

/// Worker pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of jobs processed at the same time.
    pub concurrency: usize,
    /// Job execution timeout in seconds.
    pub job_timeout_secs: u64,
    /// Polling interval in milliseconds.
    pub poll_interval_ms: u64,
    /// Shutdown timeout in seconds.
    pub shutdown_timeout_secs: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self::with_concurrency(1)
    }
}

impl WorkerConfig {
    /// Default settings with the given concurrency.
    #[must_use]
    pub const fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency,
            job_timeout_secs: 300,
            poll_interval_ms: 100,
            shutdown_timeout_secs: 30,
        }
    }

    /// Returns job timeout as Duration.
    #[must_use]
    pub const fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    /// Returns poll interval as Duration.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Returns shutdown timeout as Duration.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Push notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    /// Phone numbers that must never receive a notification.
    pub blacklist: Vec<String>,
    /// Start the notification worker pool at boot.
    pub process_on_start: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            blacklist: vec!["4153518780".to_string(), "4153518781".to_string()],
            process_on_start: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 1245);
        assert_eq!(config.seats.key, "available_seats");
        assert_eq!(config.seats.initial, 50);
        assert_eq!(config.jobs.reservations.concurrency, 1);
        assert_eq!(config.jobs.notifications.concurrency, 2);
        assert_eq!(config.jobs.keep_finished, 1000);
        assert_eq!(config.jobs.retention(), Duration::from_secs(86_400));
        assert!(config.redis.enabled);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:1245");
    }

    #[test]
    fn test_worker_durations() {
        let worker = WorkerConfig::with_concurrency(3);
        assert_eq!(worker.concurrency, 3);
        assert_eq!(worker.job_timeout(), Duration::from_secs(300));
        assert_eq!(worker.poll_interval(), Duration::from_millis(100));
        assert_eq!(worker.shutdown_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_sections_deserialize() {
        let json = r#"{"server": {"port": 8080}, "seats": {"initial": 10}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.seats.initial, 10);
        assert_eq!(config.seats.key, "available_seats");
    }
}
