//! In-process job queue.

use crate::config::Retention;
use crate::error::{JobError, JobResult};
use crate::events::JobEvents;
use crate::job::{JobData, JobId, JobInfo, JobStatus};
use crate::queue::JobQueue;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Instant;
use tracing::debug;

#[derive(Default)]
struct State {
    jobs: HashMap<JobId, JobData>,
    pending: HashMap<String, VecDeque<JobId>>,
    active: HashMap<JobId, String>,
    finished: HashMap<String, VecDeque<(Instant, JobId)>>,
}

impl State {
    /// Drops finished records past the retention limits, oldest first.
    fn prune(&mut self, retention: &Retention) {
        let mut expired = Vec::new();
        for finished in self.finished.values_mut() {
            while let Some((at, id)) = finished.front() {
                if finished.len() <= retention.keep_finished && at.elapsed() < retention.ttl {
                    break;
                }
                expired.push(id.clone());
                finished.pop_front();
            }
        }
        for id in expired {
            self.jobs.remove(&id);
        }
    }
}

/// Job queue kept in process memory.
///
/// Same semantics as the Redis queue: first in, first out per queue, and
/// finished records are kept within the configured [`Retention`]. Used
/// when Redis is disabled and in tests.
pub struct MemoryJobQueue {
    state: Mutex<State>,
    events: JobEvents,
    retention: Retention,
}

impl MemoryJobQueue {
    /// Creates an empty queue publishing on `events`.
    pub fn new(events: JobEvents) -> Self {
        Self {
            state: Mutex::new(State::default()),
            events,
            retention: Retention::default(),
        }
    }

    /// Sets how long finished jobs are kept.
    #[must_use]
    pub fn with_retention(mut self, retention: Retention) -> Self {
        self.retention = retention;
        self
    }

    fn finish(&self, job_id: &JobId, update: impl FnOnce(&mut JobData)) -> JobResult<()> {
        let mut state = self.state.lock();
        state.active.remove(job_id);
        let job = state
            .jobs
            .get_mut(job_id)
            .ok_or_else(|| JobError::NotFound(job_id.to_string()))?;
        update(job);

        let queue = job.queue.clone();
        state
            .finished
            .entry(queue)
            .or_default()
            .push_back((Instant::now(), job_id.clone()));
        state.prune(&self.retention);
        Ok(())
    }
}

impl Default for MemoryJobQueue {
    fn default() -> Self {
        Self::new(JobEvents::default())
    }
}

#[async_trait]
impl JobQueue for MemoryJobQueue {
    async fn push(&self, job: JobData) -> JobResult<()> {
        let mut state = self.state.lock();
        state
            .pending
            .entry(job.queue.clone())
            .or_default()
            .push_back(job.id.clone());

        debug!(job_id = %job.id, queue = %job.queue, "Enqueued job");
        state.jobs.insert(job.id.clone(), job);
        Ok(())
    }

    async fn dequeue(&self, queues: &[String], worker_id: &str) -> JobResult<Option<JobData>> {
        let mut state = self.state.lock();

        for queue_name in queues {
            let next = state
                .pending
                .get_mut(queue_name)
                .and_then(VecDeque::pop_front);

            if let Some(job_id) = next {
                state.active.insert(job_id.clone(), worker_id.to_string());
                if let Some(job) = state.jobs.get_mut(&job_id) {
                    job.activate();
                    debug!(job_id = %job_id, queue = %queue_name, worker_id, "Dequeued job");
                    return Ok(Some(job.clone()));
                }
            }
        }

        Ok(None)
    }

    async fn complete(&self, job_id: &JobId) -> JobResult<()> {
        self.finish(job_id, JobData::complete)?;
        debug!(job_id = %job_id, "Completed job");
        Ok(())
    }

    async fn fail(&self, job_id: &JobId, error: &JobError) -> JobResult<()> {
        self.finish(job_id, |job| job.fail(error.to_string()))?;
        debug!(job_id = %job_id, error = %error, "Failed job");
        Ok(())
    }

    async fn get_job(&self, job_id: &JobId) -> JobResult<Option<JobInfo>> {
        let mut state = self.state.lock();
        state.prune(&self.retention);
        Ok(state.jobs.get(job_id).map(|job| {
            let mut info = JobInfo::from(job.clone());
            if info.status == JobStatus::Active {
                info.worker_id = state.active.get(job_id).cloned();
            }
            info
        }))
    }

    async fn queue_length(&self, queue: &str) -> JobResult<u64> {
        let state = self.state.lock();
        Ok(state.pending.get(queue).map_or(0, |pending| pending.len() as u64))
    }

    async fn health_check(&self) -> JobResult<()> {
        Ok(())
    }

    fn events(&self) -> &JobEvents {
        &self.events
    }
}
