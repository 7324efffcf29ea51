//! Job queue abstraction.

use crate::error::{JobError, JobResult};
use crate::events::{JobEvents, JobHandle};
use crate::job::{Job, JobData, JobId, JobInfo};
use async_trait::async_trait;
use seatq_core::Interface;
use serde::{Deserialize, Serialize};

/// Storage backend for jobs.
///
/// Implementations persist job records, hand them to workers in the
/// order they were pushed and record terminal outcomes. They never retry: a failed job
/// stays failed.
#[async_trait]
pub trait JobQueue: Interface + Send + Sync {
    /// Saves a new job and makes it available to workers.
    async fn push(&self, job: JobData) -> JobResult<()>;

    /// Takes the next job from the given queues, first queue first.
    async fn dequeue(&self, queues: &[String], worker_id: &str) -> JobResult<Option<JobData>>;

    /// Marks a job as completed.
    async fn complete(&self, job_id: &JobId) -> JobResult<()>;

    /// Marks a job as failed.
    async fn fail(&self, job_id: &JobId, error: &JobError) -> JobResult<()>;

    /// Get job info by ID.
    async fn get_job(&self, job_id: &JobId) -> JobResult<Option<JobInfo>>;

    /// Number of jobs waiting in a queue.
    async fn queue_length(&self, queue: &str) -> JobResult<u64>;

    /// Health check.
    async fn health_check(&self) -> JobResult<()>;

    /// Lifecycle event channel shared with the workers.
    fn events(&self) -> &JobEvents;
}

/// Typed enqueue methods for any [`JobQueue`].
#[async_trait]
pub trait JobQueueExt: JobQueue {
    /// Enqueue a job and return a handle that sees all of its events.
    async fn enqueue<J: Job>(&self, job: J) -> JobResult<JobHandle> {
        let data = JobData::new(&job)?;
        let id = data.id.clone();
        let handle = JobHandle::new(id.clone(), self.events().subscribe(&id));
        if let Err(e) = self.push(data).await {
            self.events().unsubscribe(&id);
            return Err(e);
        }
        Ok(handle)
    }
}

impl<T: JobQueue + ?Sized> JobQueueExt for T {}

/// Queue statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueueStats {
    /// Queue name.
    pub queue: String,

    /// Pending jobs count.
    pub pending: u64,
}
