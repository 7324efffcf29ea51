//! Job trait and definitions.

use crate::error::{JobError, JobResult};
use crate::events::JobEvents;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique job identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Creates a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Creates a job ID from a string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Returns the job ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Trait for job types that can be enqueued.
///
/// The job value is the payload. Processing logic lives in the handler
/// registered on a [`WorkerPool`](crate::WorkerPool), so a handler can
/// capture the services it needs.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Debug, Serialize, Deserialize)]
/// struct SendSms {
///     phone_number: String,
/// }
///
/// impl Job for SendSms {
///     const NAME: &'static str = "send_sms";
///     const QUEUE: &'static str = "sms";
/// }
/// ```
pub trait Job: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Unique name for this job type.
    const NAME: &'static str;

    /// Queue name for this job type.
    const QUEUE: &'static str = "default";
}

/// Job lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Saved and waiting for a worker.
    #[default]
    Inactive,
    /// Picked up by a worker.
    Active,
    /// Finished successfully.
    Complete,
    /// Finished with an error.
    Failed,
}

impl JobStatus {
    /// Returns true for states a job never leaves.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Inactive => write!(f, "inactive"),
            JobStatus::Active => write!(f, "active"),
            JobStatus::Complete => write!(f, "complete"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inactive" => Ok(JobStatus::Inactive),
            "active" => Ok(JobStatus::Active),
            "complete" => Ok(JobStatus::Complete),
            "failed" => Ok(JobStatus::Failed),
            other => Err(JobError::Internal(format!("unknown job status: {other}"))),
        }
    }
}

/// Job execution context handed to handlers.
#[derive(Debug, Clone)]
pub struct JobContext {
    /// Job ID.
    pub job_id: JobId,

    /// Attempt number (1 for the first pickup).
    pub attempt: u32,

    /// Queue name.
    pub queue: String,

    /// Job started executing at this time.
    pub started_at: DateTime<Utc>,

    /// Worker ID processing this job.
    pub worker_id: String,

    events: JobEvents,
}

impl JobContext {
    /// Reports progress as `done` out of `total`.
    pub fn progress(&self, done: u64, total: u64) {
        let percent = if total == 0 {
            100
        } else {
            (u128::from(done.min(total)) * 100 / u128::from(total)) as u8
        };
        self.events.progress(&self.job_id, percent);
    }
}

/// Job record as persisted by the queue backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobData {
    /// Job ID.
    pub id: JobId,

    /// Job type name.
    pub name: String,

    /// Queue name.
    pub queue: String,

    /// Job payload.
    pub payload: serde_json::Value,

    /// Lifecycle state.
    pub status: JobStatus,

    /// Number of times a worker picked the job up.
    pub attempt: u32,

    /// When the job was created.
    pub created_at: DateTime<Utc>,

    /// Last state change.
    pub updated_at: DateTime<Utc>,

    /// Error the job failed with.
    pub last_error: Option<String>,
}

impl JobData {
    /// Creates new job data from a Job instance.
    pub fn new<J: Job>(job: &J) -> JobResult<Self> {
        let payload = serde_json::to_value(job)?;
        let now = Utc::now();

        Ok(Self {
            id: JobId::new(),
            name: J::NAME.to_string(),
            queue: J::QUEUE.to_string(),
            payload,
            status: JobStatus::Inactive,
            attempt: 0,
            created_at: now,
            updated_at: now,
            last_error: None,
        })
    }

    /// Deserialize the job payload.
    pub fn deserialize<J: Job>(&self) -> JobResult<J> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }

    /// Marks the job as picked up by a worker.
    pub fn activate(&mut self) {
        self.attempt += 1;
        self.status = JobStatus::Active;
        self.updated_at = Utc::now();
    }

    /// Marks the job as finished successfully.
    pub fn complete(&mut self) {
        self.status = JobStatus::Complete;
        self.updated_at = Utc::now();
    }

    /// Marks the job as failed with the given reason.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.last_error = Some(reason.into());
        self.updated_at = Utc::now();
    }

    /// Create job context for execution.
    pub fn to_context(&self, worker_id: &str, events: JobEvents) -> JobContext {
        JobContext {
            job_id: self.id.clone(),
            attempt: self.attempt,
            queue: self.queue.clone(),
            started_at: Utc::now(),
            worker_id: worker_id.to_string(),
            events,
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> JobResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> JobResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Job information for status queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInfo {
    /// Job ID.
    pub id: JobId,

    /// Job type name.
    pub name: String,

    /// Queue name.
    pub queue: String,

    /// Current status.
    pub status: JobStatus,

    /// Job payload.
    pub data: serde_json::Value,

    /// Attempts so far.
    pub attempt: u32,

    /// Created timestamp.
    pub created_at: DateTime<Utc>,

    /// Last state change.
    pub updated_at: DateTime<Utc>,

    /// Failure reason, if the job failed.
    pub error: Option<String>,

    /// Worker ID (if being processed).
    pub worker_id: Option<String>,
}

impl From<JobData> for JobInfo {
    fn from(data: JobData) -> Self {
        Self {
            id: data.id,
            name: data.name,
            queue: data.queue,
            status: data.status,
            data: data.payload,
            attempt: data.attempt,
            created_at: data.created_at,
            updated_at: data.updated_at,
            error: data.last_error,
            worker_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    struct TestJob {
        message: String,
    }

    impl Job for TestJob {
        const NAME: &'static str = "test_job";
        const QUEUE: &'static str = "test";
    }

    #[test]
    fn test_job_id_generation() {
        let id1 = JobId::new();
        let id2 = JobId::new();
        assert_ne!(id1, id2);
        assert!(Uuid::parse_str(id1.as_str()).is_ok());
    }

    #[test]
    fn test_job_data_new() {
        let job = TestJob {
            message: "Hello".to_string(),
        };

        let data = JobData::new(&job).unwrap();
        assert_eq!(data.name, "test_job");
        assert_eq!(data.queue, "test");
        assert_eq!(data.status, JobStatus::Inactive);
        assert_eq!(data.payload["message"], "Hello");

        let restored: TestJob = data.deserialize().unwrap();
        assert_eq!(restored.message, "Hello");
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut data = JobData::new(&TestJob {
            message: "x".to_string(),
        })
        .unwrap();

        data.activate();
        assert_eq!(data.status, JobStatus::Active);
        assert_eq!(data.attempt, 1);
        assert!(!data.status.is_terminal());

        data.fail("Phone number 1 is blacklisted");
        assert_eq!(data.status, JobStatus::Failed);
        assert!(data.status.is_terminal());
        assert_eq!(data.last_error.as_deref(), Some("Phone number 1 is blacklisted"));
    }

    #[test]
    fn test_job_info_json_shape() {
        let mut data = JobData::new(&TestJob {
            message: "hi".to_string(),
        })
        .unwrap();
        data.complete();

        let json = serde_json::to_value(JobInfo::from(data.clone())).unwrap();
        assert_eq!(json["id"], data.id.as_str());
        assert_eq!(json["status"], "complete");
        assert_eq!(json["data"]["message"], "hi");
        assert!(json["error"].is_null());
    }

    #[tokio::test]
    async fn test_context_progress_emits_percent() {
        let events = JobEvents::new();
        let data = JobData::new(&TestJob {
            message: "x".to_string(),
        })
        .unwrap();
        let mut rx = events.subscribe(&data.id);
        let ctx = data.to_context("worker-1", events);

        ctx.progress(50, 100);
        ctx.progress(3, 0);

        assert_eq!(rx.recv().await, Some(crate::JobEventKind::Progress(50)));
        assert_eq!(rx.recv().await, Some(crate::JobEventKind::Progress(100)));
    }

    #[tokio::test]
    async fn test_context_progress_with_huge_counts() {
        let events = JobEvents::new();
        let data = JobData::new(&TestJob {
            message: "x".to_string(),
        })
        .unwrap();
        let mut rx = events.subscribe(&data.id);
        let ctx = data.to_context("worker-1", events);

        ctx.progress(u64::MAX, u64::MAX);
        ctx.progress(u64::MAX / 2, u64::MAX);
        ctx.progress(u64::MAX, 10);

        assert_eq!(rx.recv().await, Some(crate::JobEventKind::Progress(100)));
        assert_eq!(rx.recv().await, Some(crate::JobEventKind::Progress(49)));
        assert_eq!(rx.recv().await, Some(crate::JobEventKind::Progress(100)));
    }

    #[test]
    fn test_status_parses_its_display_form() {
        for status in [
            JobStatus::Inactive,
            JobStatus::Active,
            JobStatus::Complete,
            JobStatus::Failed,
        ] {
            assert_eq!(status.to_string().parse::<JobStatus>().unwrap(), status);
        }
        assert!("done".parse::<JobStatus>().is_err());
    }
}
