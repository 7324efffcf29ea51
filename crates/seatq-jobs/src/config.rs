//! Worker pool and retention configuration.

use seatq_config::{JobsConfig, WorkerConfig};
use std::time::Duration;

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of jobs processed at the same time.
    pub concurrency: usize,

    /// Queues to process, first queue first.
    pub queues: Vec<String>,

    /// Job execution timeout.
    pub job_timeout: Duration,

    /// Polling interval.
    pub poll_interval: Duration,

    /// Shutdown timeout.
    pub shutdown_timeout: Duration,
}

impl WorkerPoolConfig {
    /// Processes only the given queue.
    #[must_use]
    pub fn queue(mut self, queue: impl Into<String>) -> Self {
        self.queues = vec![queue.into()];
        self
    }
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self::from(&WorkerConfig::default())
    }
}

impl From<&WorkerConfig> for WorkerPoolConfig {
    fn from(config: &WorkerConfig) -> Self {
        Self {
            concurrency: config.concurrency.max(1),
            queues: vec!["default".to_string()],
            job_timeout: config.job_timeout(),
            poll_interval: config.poll_interval(),
            shutdown_timeout: config.shutdown_timeout(),
        }
    }
}

/// How long finished job records are kept.
///
/// A queue keeps at most `keep_finished` finished jobs per queue name and
/// drops each record once it is older than `ttl`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retention {
    /// Finished jobs kept per queue.
    pub keep_finished: usize,

    /// Lifetime of a finished record.
    pub ttl: Duration,
}

impl Default for Retention {
    fn default() -> Self {
        Self::from(&JobsConfig::default())
    }
}

impl From<&JobsConfig> for Retention {
    fn from(config: &JobsConfig) -> Self {
        Self {
            keep_finished: config.keep_finished.max(1),
            ttl: config.retention(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_pool_config_default() {
        let config = WorkerPoolConfig::default();
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.queues, vec!["default".to_string()]);
        assert_eq!(config.job_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_from_worker_config() {
        let config = WorkerPoolConfig::from(&WorkerConfig::with_concurrency(2)).queue("push_notification_code");
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.queues, vec!["push_notification_code".to_string()]);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn test_retention_from_jobs_config() {
        let retention = Retention::default();
        assert_eq!(retention.keep_finished, 1000);
        assert_eq!(retention.ttl, Duration::from_secs(86_400));

        let config = JobsConfig {
            keep_finished: 0,
            ..JobsConfig::default()
        };
        assert_eq!(Retention::from(&config).keep_finished, 1);
    }
}
