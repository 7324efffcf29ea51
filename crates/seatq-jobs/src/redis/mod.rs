//! Redis-backed job queue implementation.

mod queue;

pub use queue::RedisJobQueue;

/// Redis key builder for job queue.
#[derive(Debug, Clone)]
pub struct RedisKeys {
    prefix: String,
}

impl RedisKeys {
    /// Create a new key builder with the given prefix.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The key prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Pending jobs key (sorted set of job ids by push sequence).
    pub fn pending(&self, queue_name: &str) -> String {
        format!("{}:pending:{}", self.prefix, queue_name)
    }

    /// Push sequence counter.
    pub fn sequence(&self) -> String {
        format!("{}:seq", self.prefix)
    }

    /// Active jobs key (hash: job_id -> worker_id).
    pub fn active(&self) -> String {
        format!("{}:active", self.prefix)
    }

    /// Job record key (hash).
    pub fn job(&self, job_id: &str) -> String {
        format!("{}:job:{}", self.prefix, job_id)
    }

    /// Finished jobs key (sorted set by finish time).
    pub fn finished(&self, queue_name: &str) -> String {
        format!("{}:finished:{}", self.prefix, queue_name)
    }

    /// Stats key.
    pub fn stats(&self, queue_name: &str) -> String {
        format!("{}:stats:{}", self.prefix, queue_name)
    }
}

impl Default for RedisKeys {
    fn default() -> Self {
        Self::new("seatq:jobs")
    }
}
