//! Job lifecycle events.
//!
//! Workers publish progress and outcomes through [`JobEvents`]. Each event
//! is routed to the watchers registered for that job only, so a busy queue
//! never crowds out the terminal event of another job.

use crate::job::JobId;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What happened to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum JobEventKind {
    /// Progress in percent.
    Progress(u8),
    /// The job finished successfully.
    Completed,
    /// The job failed with the given reason.
    Failed(String),
}

impl JobEventKind {
    /// Returns true for events that end a job.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobEventKind::Progress(_))
    }
}

type Watchers = HashMap<JobId, Vec<mpsc::UnboundedSender<JobEventKind>>>;

/// Publisher side of the job events, keyed by job.
///
/// Clones share the same registry. A job's watchers are dropped after its
/// terminal event.
#[derive(Debug, Clone, Default)]
pub struct JobEvents {
    watchers: Arc<Mutex<Watchers>>,
}

impl JobEvents {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Receives every event published for `job_id` after this call.
    pub fn subscribe(&self, job_id: &JobId) -> mpsc::UnboundedReceiver<JobEventKind> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.watchers.lock().entry(job_id.clone()).or_default().push(tx);
        rx
    }

    /// Drops the watchers of a job that will never run.
    pub fn unsubscribe(&self, job_id: &JobId) {
        self.watchers.lock().remove(job_id);
    }

    /// Number of jobs with at least one watcher.
    pub fn watched_jobs(&self) -> usize {
        self.watchers.lock().len()
    }

    /// Publishes a progress event.
    pub fn progress(&self, job_id: &JobId, percent: u8) {
        self.emit(job_id, JobEventKind::Progress(percent.min(100)));
    }

    /// Publishes a completion event.
    pub fn completed(&self, job_id: &JobId) {
        self.emit(job_id, JobEventKind::Completed);
    }

    /// Publishes a failure event.
    pub fn failed(&self, job_id: &JobId, reason: &str) {
        self.emit(job_id, JobEventKind::Failed(reason.to_string()));
    }

    fn emit(&self, job_id: &JobId, kind: JobEventKind) {
        let mut watchers = self.watchers.lock();
        let Some(senders) = watchers.get_mut(job_id) else {
            return;
        };

        // Closed receivers belong to handles that were dropped.
        senders.retain(|tx| tx.send(kind.clone()).is_ok());

        if kind.is_terminal() || senders.is_empty() {
            watchers.remove(job_id);
        }
    }
}

type CompleteCallback = Box<dyn FnOnce(&JobId) + Send>;
type FailedCallback = Box<dyn FnOnce(&JobId, &str) + Send>;
type ProgressCallback = Box<dyn FnMut(&JobId, u8) + Send>;

/// Handle to an enqueued job.
///
/// The handle is registered before the job is saved, so it sees every
/// event of its job. Attach callbacks, then call [`watch`](Self::watch) to
/// run them in the background, or [`wait`](Self::wait) to await the outcome.
pub struct JobHandle {
    id: JobId,
    rx: mpsc::UnboundedReceiver<JobEventKind>,
    on_complete: Option<CompleteCallback>,
    on_failed: Option<FailedCallback>,
    on_progress: Option<ProgressCallback>,
}

impl JobHandle {
    /// Creates a handle for `id` reading from `rx`.
    pub fn new(id: JobId, rx: mpsc::UnboundedReceiver<JobEventKind>) -> Self {
        Self {
            id,
            rx,
            on_complete: None,
            on_failed: None,
            on_progress: None,
        }
    }

    /// The job ID.
    pub fn id(&self) -> &JobId {
        &self.id
    }

    /// Runs `callback` when the job completes.
    #[must_use]
    pub fn on_complete(mut self, callback: impl FnOnce(&JobId) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Runs `callback` with the failure reason when the job fails.
    #[must_use]
    pub fn on_failed(mut self, callback: impl FnOnce(&JobId, &str) + Send + 'static) -> Self {
        self.on_failed = Some(Box::new(callback));
        self
    }

    /// Runs `callback` on every progress report.
    #[must_use]
    pub fn on_progress(mut self, callback: impl FnMut(&JobId, u8) + Send + 'static) -> Self {
        self.on_progress = Some(Box::new(callback));
        self
    }

    /// Follows the job in a background task until it finishes.
    pub fn watch(self) -> JoinHandle<Option<JobEventKind>> {
        tokio::spawn(self.wait())
    }

    /// Dispatches callbacks until the job finishes and returns the final
    /// event. Returns `None` if the publisher goes away first.
    pub async fn wait(mut self) -> Option<JobEventKind> {
        while let Some(kind) = self.rx.recv().await {
            match &kind {
                JobEventKind::Progress(percent) => {
                    if let Some(callback) = self.on_progress.as_mut() {
                        callback(&self.id, *percent);
                    }
                }
                JobEventKind::Completed => {
                    if let Some(callback) = self.on_complete.take() {
                        callback(&self.id);
                    }
                }
                JobEventKind::Failed(reason) => {
                    if let Some(callback) = self.on_failed.take() {
                        callback(&self.id, reason);
                    }
                }
            }

            if kind.is_terminal() {
                return Some(kind);
            }
        }
        None
    }
}

impl fmt::Debug for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("id", &self.id)
            .field("on_complete", &self.on_complete.is_some())
            .field("on_failed", &self.on_failed.is_some())
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_runs_callbacks_for_its_job_only() {
        let events = JobEvents::new();
        let id = JobId::new();
        let other = JobId::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let progress_log = Arc::clone(&seen);
        let complete_log = Arc::clone(&seen);
        let handle = JobHandle::new(id.clone(), events.subscribe(&id))
            .on_progress(move |_, percent| progress_log.lock().push(format!("{percent}%")))
            .on_complete(move |_| complete_log.lock().push("done".to_string()));

        events.progress(&other, 10);
        events.progress(&id, 0);
        events.progress(&id, 50);
        events.completed(&other);
        events.completed(&id);

        assert_eq!(handle.wait().await, Some(JobEventKind::Completed));
        assert_eq!(*seen.lock(), vec!["0%", "50%", "done"]);
    }

    #[tokio::test]
    async fn test_handle_reports_failure_reason() {
        let events = JobEvents::new();
        let id = JobId::new();
        let reason = Arc::new(Mutex::new(None));

        let captured = Arc::clone(&reason);
        let handle = JobHandle::new(id.clone(), events.subscribe(&id))
            .on_failed(move |_, err| *captured.lock() = Some(err.to_string()));

        events.failed(&id, "Not enough seats available");

        let outcome = handle.watch().await.unwrap();
        assert_eq!(
            outcome,
            Some(JobEventKind::Failed("Not enough seats available".to_string()))
        );
        assert_eq!(reason.lock().as_deref(), Some("Not enough seats available"));
    }

    #[tokio::test]
    async fn test_terminal_event_releases_watchers() {
        let events = JobEvents::new();
        let id = JobId::new();
        let first = JobHandle::new(id.clone(), events.subscribe(&id));
        let second = JobHandle::new(id.clone(), events.subscribe(&id));
        assert_eq!(events.watched_jobs(), 1);

        events.completed(&id);
        assert_eq!(events.watched_jobs(), 0);
        assert_eq!(first.wait().await, Some(JobEventKind::Completed));
        assert_eq!(second.wait().await, Some(JobEventKind::Completed));
    }

    #[tokio::test]
    async fn test_many_jobs_all_reach_their_watchers() {
        let events = JobEvents::new();
        let ids: Vec<JobId> = (0..5_000).map(|_| JobId::new()).collect();
        let handles: Vec<_> = ids
            .iter()
            .map(|id| JobHandle::new(id.clone(), events.subscribe(id)))
            .collect();

        for id in &ids {
            events.progress(id, 50);
            events.completed(id);
        }

        for handle in handles {
            assert_eq!(handle.wait().await, Some(JobEventKind::Completed));
        }
        assert_eq!(events.watched_jobs(), 0);
    }

    #[tokio::test]
    async fn test_unsubscribe_ends_the_handle() {
        let events = JobEvents::new();
        let id = JobId::new();
        let handle = JobHandle::new(id.clone(), events.subscribe(&id));

        events.unsubscribe(&id);
        assert_eq!(handle.wait().await, None);
    }

    #[test]
    fn test_dropped_handle_is_pruned() {
        let events = JobEvents::new();
        let id = JobId::new();
        drop(events.subscribe(&id));

        events.progress(&id, 10);
        assert_eq!(events.watched_jobs(), 0);
    }

    #[test]
    fn test_emit_without_watchers() {
        let events = JobEvents::default();
        events.completed(&JobId::new());
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(!JobEventKind::Progress(50).is_terminal());
        assert!(JobEventKind::Completed.is_terminal());
        assert!(JobEventKind::Failed("x".into()).is_terminal());
    }
}
