//! Redis job queue implementation.

use super::RedisKeys;
use crate::config::Retention;
use crate::error::{JobError, JobResult};
use crate::events::JobEvents;
use crate::job::{JobData, JobId, JobInfo, JobStatus};
use crate::queue::JobQueue;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_redis::Pool;
use redis::{AsyncCommands, Script};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error};

/// Saves the record and appends the id to the pending set.
///
/// KEYS: job, pending, sequence, stats.
/// ARGV: job id, record JSON, queue, updated_at.
const PUSH_SCRIPT: &str = r"
local seq = redis.call('INCR', KEYS[3])
redis.call('HSET', KEYS[1],
    'data', ARGV[2], 'queue', ARGV[3], 'status', 'inactive',
    'attempt', 0, 'updated_at', ARGV[4])
redis.call('ZADD', KEYS[2], seq, ARGV[1])
redis.call('HINCRBY', KEYS[4], 'created', 1)
return seq
";

/// Pops the oldest pending id and marks its record active.
///
/// Returns nil when the queue is empty, `{id}` when the record is gone and
/// `{id, field, value, ...}` otherwise.
///
/// KEYS: pending, active.
/// ARGV: worker id, updated_at, key prefix.
const DEQUEUE_SCRIPT: &str = r"
local popped = redis.call('ZPOPMIN', KEYS[1])
if #popped == 0 then
    return false
end
local id = popped[1]
local job = ARGV[3] .. ':job:' .. id
if redis.call('EXISTS', job) == 0 then
    return {id}
end
redis.call('HSET', job, 'status', 'active', 'updated_at', ARGV[2])
redis.call('HINCRBY', job, 'attempt', 1)
redis.call('HSET', KEYS[2], id, ARGV[1])
local record = redis.call('HGETALL', job)
table.insert(record, 1, id)
return record
";

/// Records a terminal state and applies retention to the queue's
/// finished index. Returns 0 when the record does not exist.
///
/// The finished and stats keys are derived from the record's queue.
///
/// KEYS: job, active.
/// ARGV: job id, status, updated_at, now ms, error, key prefix,
/// ttl secs, keep finished, stats field.
const FINISH_SCRIPT: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
local queue = redis.call('HGET', KEYS[1], 'queue')
redis.call('HSET', KEYS[1], 'status', ARGV[2], 'updated_at', ARGV[3])
if ARGV[2] == 'failed' then
    redis.call('HSET', KEYS[1], 'error', ARGV[5])
end
redis.call('HDEL', KEYS[2], ARGV[1])
redis.call('EXPIRE', KEYS[1], ARGV[7])

local finished = ARGV[6] .. ':finished:' .. queue
local now = tonumber(ARGV[4])
redis.call('ZADD', finished, now, ARGV[1])
redis.call('ZREMRANGEBYSCORE', finished, '-inf', now - tonumber(ARGV[7]) * 1000)
local overflow = redis.call('ZCARD', finished) - tonumber(ARGV[8])
if overflow > 0 then
    for _, id in ipairs(redis.call('ZRANGE', finished, 0, overflow - 1)) do
        redis.call('DEL', ARGV[6] .. ':job:' .. id)
    end
    redis.call('ZREMRANGEBYRANK', finished, 0, overflow - 1)
end

redis.call('HINCRBY', ARGV[6] .. ':stats:' .. queue, ARGV[9], 1)
return 1
";

/// Redis-backed job queue.
///
/// Each job is a hash under `<prefix>:job:<id>` holding the JSON record
/// pushed by the client plus its mutable state (`status`, `attempt`,
/// `updated_at`, `error`). Pending ids sit in a per-queue sorted set
/// scored by push sequence. Every state change runs as one Lua script, so
/// a popped id is never separated from its record.
pub struct RedisJobQueue {
    pool: Arc<Pool>,
    keys: RedisKeys,
    events: JobEvents,
    retention: Retention,
    push_script: Script,
    dequeue_script: Script,
    finish_script: Script,
}

impl RedisJobQueue {
    /// Create a new Redis job queue.
    pub fn new(pool: Arc<Pool>, key_prefix: &str, events: JobEvents) -> Self {
        Self {
            pool,
            keys: RedisKeys::new(key_prefix),
            events,
            retention: Retention::default(),
            push_script: Script::new(PUSH_SCRIPT),
            dequeue_script: Script::new(DEQUEUE_SCRIPT),
            finish_script: Script::new(FINISH_SCRIPT),
        }
    }

    /// Sets how long finished jobs are kept.
    #[must_use]
    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }

    /// Get a connection from the pool.
    async fn conn(&self) -> JobResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    /// Builds job data from the fields of a job hash.
    fn from_record(mut fields: HashMap<String, String>) -> JobResult<JobData> {
        let data = fields
            .remove("data")
            .ok_or_else(|| JobError::Internal("job record has no data".to_string()))?;
        let mut job = JobData::from_json(&data)?;

        if let Some(status) = fields.get("status") {
            job.status = status.parse()?;
        }
        if let Some(attempt) = fields.get("attempt") {
            job.attempt = attempt
                .parse()
                .map_err(|_| JobError::Internal(format!("invalid attempt: {attempt}")))?;
        }
        if let Some(updated_at) = fields.get("updated_at") {
            job.updated_at = updated_at
                .parse::<DateTime<Utc>>()
                .map_err(|e| JobError::Internal(format!("invalid updated_at: {e}")))?;
        }
        job.last_error = fields.remove("error");

        Ok(job)
    }

    /// Writes the terminal state of a job and applies retention.
    async fn finish(&self, job_id: &JobId, status: JobStatus, error: &str) -> JobResult<()> {
        let stat = match status {
            JobStatus::Failed => "failed",
            _ => "completed",
        };

        let mut conn = self.conn().await?;
        let now = Utc::now();
        let found: i64 = self
            .finish_script
            .key(self.keys.job(job_id.as_str()))
            .key(self.keys.active())
            .arg(job_id.as_str())
            .arg(status.to_string())
            .arg(now.to_rfc3339())
            .arg(now.timestamp_millis())
            .arg(error)
            .arg(self.keys.prefix())
            .arg(self.retention.ttl.as_secs().max(1))
            .arg(self.retention.keep_finished)
            .arg(stat)
            .invoke_async(&mut *conn)
            .await?;

        if found == 0 {
            return Err(JobError::NotFound(job_id.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl JobQueue for RedisJobQueue {
    async fn push(&self, job: JobData) -> JobResult<()> {
        let job_json = job.to_json()?;
        let mut conn = self.conn().await?;

        let _: i64 = self
            .push_script
            .key(self.keys.job(job.id.as_str()))
            .key(self.keys.pending(&job.queue))
            .key(self.keys.sequence())
            .key(self.keys.stats(&job.queue))
            .arg(job.id.as_str())
            .arg(&job_json)
            .arg(&job.queue)
            .arg(job.updated_at.to_rfc3339())
            .invoke_async(&mut *conn)
            .await?;

        debug!(job_id = %job.id, queue = %job.queue, "Enqueued job");

        Ok(())
    }

    async fn dequeue(&self, queues: &[String], worker_id: &str) -> JobResult<Option<JobData>> {
        let mut conn = self.conn().await?;

        for queue_name in queues {
            // Loops past ids whose records are gone or unreadable.
            loop {
                let popped: Option<Vec<String>> = self
                    .dequeue_script
                    .key(self.keys.pending(queue_name))
                    .key(self.keys.active())
                    .arg(worker_id)
                    .arg(Utc::now().to_rfc3339())
                    .arg(self.keys.prefix())
                    .invoke_async(&mut *conn)
                    .await?;

                let Some(mut reply) = popped else {
                    break;
                };
                if reply.is_empty() {
                    break;
                }
                let job_id = JobId::from(reply.remove(0));

                if reply.is_empty() {
                    error!(job_id = %job_id, "Queued job has no record");
                    continue;
                }

                let mut fields = HashMap::with_capacity(reply.len() / 2);
                let mut pairs = reply.into_iter();
                while let (Some(field), Some(value)) = (pairs.next(), pairs.next()) {
                    fields.insert(field, value);
                }

                match Self::from_record(fields) {
                    Ok(job_data) => {
                        debug!(
                            job_id = %job_data.id,
                            queue = %job_data.queue,
                            attempt = job_data.attempt,
                            worker_id = %worker_id,
                            "Dequeued job"
                        );
                        return Ok(Some(job_data));
                    }
                    Err(e) => {
                        error!(job_id = %job_id, error = %e, "Unreadable job record");
                        self.finish(&job_id, JobStatus::Failed, &e.to_string()).await?;
                        self.events.failed(&job_id, &e.to_string());
                    }
                }
            }
        }

        Ok(None)
    }

    async fn complete(&self, job_id: &JobId) -> JobResult<()> {
        self.finish(job_id, JobStatus::Complete, "").await?;
        debug!(job_id = %job_id, "Completed job");
        Ok(())
    }

    async fn fail(&self, job_id: &JobId, error: &JobError) -> JobResult<()> {
        self.finish(job_id, JobStatus::Failed, &error.to_string()).await?;
        debug!(job_id = %job_id, error = %error, "Failed job");
        Ok(())
    }

    async fn get_job(&self, job_id: &JobId) -> JobResult<Option<JobInfo>> {
        let mut conn = self.conn().await?;

        let fields: HashMap<String, String> = conn.hgetall(self.keys.job(job_id.as_str())).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        let mut info = JobInfo::from(Self::from_record(fields)?);

        if info.status == JobStatus::Active {
            info.worker_id = conn.hget(self.keys.active(), job_id.as_str()).await?;
        }

        Ok(Some(info))
    }

    async fn queue_length(&self, queue: &str) -> JobResult<u64> {
        let mut conn = self.conn().await?;
        let count: u64 = conn.zcard(self.keys.pending(queue)).await?;
        Ok(count)
    }

    async fn health_check(&self) -> JobResult<()> {
        let mut conn = self.conn().await?;
        let _: String = redis::cmd("PING").query_async(&mut *conn).await?;
        Ok(())
    }

    fn events(&self) -> &JobEvents {
        &self.events
    }
}
