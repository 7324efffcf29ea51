//! Notification service implementation.

use crate::jobs::PushNotification;
use crate::notification_service::NotificationService;
use async_trait::async_trait;
use seatq_core::SeatqResult;
use seatq_jobs::{JobContext, JobError, JobId, JobQueue, JobQueueExt, JobResult, WorkerPool};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

/// Notification service backed by the job queue.
pub struct NotificationServiceImpl {
    queue: Arc<dyn JobQueue>,
    pool: Arc<WorkerPool>,
}

impl NotificationServiceImpl {
    /// Creates the service and registers the `push_notification_code`
    /// handler on `pool`. Numbers in `blacklist` are never notified.
    pub fn new(
        queue: Arc<dyn JobQueue>,
        pool: Arc<WorkerPool>,
        blacklist: impl IntoIterator<Item = String>,
    ) -> Self {
        let blacklist: Arc<HashSet<String>> = Arc::new(blacklist.into_iter().collect());

        pool.register::<PushNotification, _, _>(move |job, ctx| {
            let blacklist = Arc::clone(&blacklist);
            async move { send_notification(&blacklist, &job, &ctx) }
        });

        Self { queue, pool }
    }
}

/// Delivers one notification.
fn send_notification(
    blacklist: &HashSet<String>,
    job: &PushNotification,
    ctx: &JobContext,
) -> JobResult<()> {
    ctx.progress(0, 100);

    if blacklist.contains(&job.phone_number) {
        return Err(JobError::rejected(format!(
            "Phone number {} is blacklisted",
            job.phone_number
        )));
    }

    ctx.progress(50, 100);
    info!(
        "Sending notification to {}, with message: {}",
        job.phone_number, job.message
    );
    Ok(())
}

#[async_trait]
impl NotificationService for NotificationServiceImpl {
    async fn create_jobs(&self, jobs: Vec<PushNotification>) -> SeatqResult<Vec<JobId>> {
        let mut ids = Vec::with_capacity(jobs.len());

        for job in jobs {
            let handle = self.queue.enqueue(job).await?;
            let id = handle.id().clone();
            info!("Notification job created: {}", id);

            handle
                .on_complete(|id| info!("Notification job {} completed", id))
                .on_failed(|id, err| info!("Notification job {} failed: {}", id, err))
                .on_progress(|id, percent| info!("Notification job {} {}% complete", id, percent))
                .watch();
            ids.push(id);
        }

        Ok(ids)
    }

    fn start_processing(&self) -> bool {
        self.pool.spawn()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seatq_jobs::{JobEventKind, JobHandle, JobStatus, MemoryJobQueue, WorkerPoolConfig};
    use std::time::Duration;

    const BLACKLISTED: &str = "4153518780";

    fn notification(phone_number: &str) -> PushNotification {
        PushNotification {
            phone_number: phone_number.to_string(),
            message: "This is the code 1234 to verify your account".to_string(),
        }
    }

    fn service() -> (NotificationServiceImpl, Arc<MemoryJobQueue>) {
        let queue = Arc::new(MemoryJobQueue::default());
        let config = WorkerPoolConfig {
            concurrency: 2,
            poll_interval: Duration::from_millis(5),
            ..WorkerPoolConfig::default()
        }
        .queue("push_notification_code");
        let pool = Arc::new(WorkerPool::new(queue.clone(), config));
        let service = NotificationServiceImpl::new(
            queue.clone(),
            pool,
            vec![BLACKLISTED.to_string(), "4153518781".to_string()],
        );
        (service, queue)
    }

    #[tokio::test]
    async fn test_create_jobs_returns_ids_in_order() {
        let (service, queue) = service();

        let ids = service
            .create_jobs(vec![notification("4153518743"), notification("4153538781")])
            .await
            .unwrap();

        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        assert_eq!(queue.queue_length("push_notification_code").await.unwrap(), 2);
        let first = queue.get_job(&ids[0]).await.unwrap().unwrap();
        assert_eq!(first.data["phoneNumber"], "4153518743");
        assert_eq!(first.status, JobStatus::Inactive);
    }

    #[tokio::test]
    async fn test_create_no_jobs() {
        let (service, _) = service();
        assert!(service.create_jobs(Vec::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_processing_reports_progress_and_blacklist() {
        let (service, queue) = service();

        let ids = service
            .create_jobs(vec![notification("4153518743"), notification(BLACKLISTED)])
            .await
            .unwrap();
        let delivered = JobHandle::new(ids[0].clone(), queue.events().subscribe(&ids[0]));
        let rejected = JobHandle::new(ids[1].clone(), queue.events().subscribe(&ids[1]));
        assert!(service.start_processing());

        let (delivered, rejected) = tokio::time::timeout(Duration::from_secs(5), async {
            futures::join!(delivered.wait(), rejected.wait())
        })
        .await
        .expect("notification jobs did not finish");

        assert_eq!(delivered, Some(JobEventKind::Completed));
        assert_eq!(
            rejected,
            Some(JobEventKind::Failed(
                "Phone number 4153518780 is blacklisted".to_string()
            ))
        );

        let failed = queue.get_job(&ids[1]).await.unwrap().unwrap();
        assert_eq!(failed.status, JobStatus::Failed);
        service.pool.shutdown().await;
    }

    #[test]
    fn test_send_notification_progress_sequence() {
        let events = seatq_jobs::JobEvents::new();
        let data = seatq_jobs::JobData::new(&notification("4153518743")).unwrap();
        let mut rx = events.subscribe(&data.id);
        let ctx = data.to_context("worker-1", events);

        send_notification(&HashSet::new(), &notification("4153518743"), &ctx).unwrap();

        assert_eq!(rx.try_recv().unwrap(), JobEventKind::Progress(0));
        assert_eq!(rx.try_recv().unwrap(), JobEventKind::Progress(50));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_blacklisted_number_stops_at_zero_percent() {
        let events = seatq_jobs::JobEvents::new();
        let data = seatq_jobs::JobData::new(&notification(BLACKLISTED)).unwrap();
        let mut rx = events.subscribe(&data.id);
        let ctx = data.to_context("worker-1", events);
        let blacklist: HashSet<String> = [BLACKLISTED.to_string()].into();

        let err = send_notification(&blacklist, &notification(BLACKLISTED), &ctx).unwrap_err();

        assert_eq!(err.to_string(), "Phone number 4153518780 is blacklisted");
        assert_eq!(rx.try_recv().unwrap(), JobEventKind::Progress(0));
        assert!(rx.try_recv().is_err());
    }
}
