//! Worker pool for processing jobs.

use crate::config::WorkerPoolConfig;
use crate::error::{JobError, JobResult};
use crate::job::{Job, JobContext, JobData};
use crate::queue::JobQueue;
use futures::future::BoxFuture;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

/// Job handler function type.
pub type JobHandler =
    Arc<dyn Fn(JobData, JobContext) -> BoxFuture<'static, JobResult<()>> + Send + Sync>;

/// State shared by the pool loop and its worker tasks.
#[derive(Clone)]
struct Dispatcher {
    queue: Arc<dyn JobQueue>,
    handlers: Arc<RwLock<HashMap<String, JobHandler>>>,
    queues: Arc<[String]>,
    job_timeout: Duration,
    stopping: Arc<AtomicBool>,
    jobs_processed: Arc<AtomicU64>,
    jobs_failed: Arc<AtomicU64>,
}

impl Dispatcher {
    /// Takes jobs until the queues are empty or the pool is stopping.
    async fn drain(&self, worker_id: &str) {
        while !self.stopping.load(Ordering::SeqCst) {
            match self.queue.dequeue(&self.queues, worker_id).await {
                Ok(Some(job_data)) => self.run_job(job_data, worker_id).await,
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "Failed to dequeue job");
                    break;
                }
            }
        }
    }

    async fn run_job(&self, job_data: JobData, worker_id: &str) {
        let job_id = job_data.id.clone();
        let queue_name = job_data.queue.clone();

        debug!(
            job_id = %job_id,
            job_name = %job_data.name,
            worker_id = %worker_id,
            "Processing job"
        );

        let handler = self.handlers.read().get(&job_data.name).cloned();
        let result = match handler {
            Some(handler) => {
                let ctx = job_data.to_context(worker_id, self.queue.events().clone());
                match timeout(self.job_timeout, handler(job_data, ctx)).await {
                    Ok(result) => result,
                    Err(_) => Err(JobError::Timeout(self.job_timeout.as_secs())),
                }
            }
            None => {
                error!(job_name = %job_data.name, "No handler registered for job type");
                Err(JobError::Configuration(format!(
                    "No handler for job type: {}",
                    job_data.name
                )))
            }
        };

        let events = self.queue.events();
        match result {
            Ok(()) => {
                if let Err(e) = self.queue.complete(&job_id).await {
                    error!(job_id = %job_id, error = %e, "Failed to mark job as complete");
                }
                self.jobs_processed.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("seatq_jobs_processed_total", "queue" => queue_name).increment(1);
                debug!(job_id = %job_id, "Job completed successfully");
                events.completed(&job_id);
            }
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Job execution failed");
                if let Err(store_err) = self.queue.fail(&job_id, &e).await {
                    error!(job_id = %job_id, error = %store_err, "Failed to mark job as failed");
                }
                self.jobs_failed.fetch_add(1, Ordering::Relaxed);
                metrics::counter!("seatq_jobs_failed_total", "queue" => queue_name).increment(1);
                events.failed(&job_id, &e.to_string());
            }
        }
    }
}

/// Worker pool for concurrent job processing.
///
/// Handlers are registered per job type. Processing starts once with
/// [`spawn`](Self::spawn) and runs in the background until
/// [`shutdown`](Self::shutdown).
pub struct WorkerPool {
    /// Unique pool ID.
    id: String,

    /// Pool configuration.
    config: WorkerPoolConfig,

    dispatcher: Dispatcher,

    /// Shutdown signal sender.
    shutdown_tx: broadcast::Sender<()>,

    /// Running flag.
    running: Arc<AtomicBool>,

    /// Background task started by `spawn`.
    task: Mutex<Option<JoinHandle<()>>>,
}

impl WorkerPool {
    /// Create a new worker pool.
    pub fn new(queue: Arc<dyn JobQueue>, config: WorkerPoolConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let dispatcher = Dispatcher {
            queue,
            handlers: Arc::new(RwLock::new(HashMap::new())),
            queues: config.queues.clone().into(),
            job_timeout: config.job_timeout,
            stopping: Arc::new(AtomicBool::new(false)),
            jobs_processed: Arc::new(AtomicU64::new(0)),
            jobs_failed: Arc::new(AtomicU64::new(0)),
        };

        Self {
            id: format!("worker-pool-{}", Uuid::new_v4()),
            config,
            dispatcher,
            shutdown_tx,
            running: Arc::new(AtomicBool::new(false)),
            task: Mutex::new(None),
        }
    }

    /// Register a job handler.
    pub fn register<J, F, Fut>(&self, handler: F)
    where
        J: Job,
        F: Fn(J, JobContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = JobResult<()>> + Send + 'static,
    {
        let handler_fn: JobHandler = Arc::new(
            move |job_data: JobData, ctx: JobContext| -> BoxFuture<'static, JobResult<()>> {
                match job_data.deserialize::<J>() {
                    Ok(job) => Box::pin(handler(job, ctx)),
                    Err(e) => Box::pin(async move { Err(e) }),
                }
            },
        );

        self.dispatcher
            .handlers
            .write()
            .insert(J::NAME.to_string(), handler_fn);
        info!(job_type = J::NAME, pool_id = %self.id, "Registered job handler");
    }

    /// Starts the pool in a background task.
    ///
    /// Returns false without doing anything if the pool is already running.
    pub fn spawn(self: &Arc<Self>) -> bool {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!(pool_id = %self.id, "Worker pool already running");
            return false;
        }

        let shutdown_rx = self.shutdown_tx.subscribe();
        let pool = Arc::clone(self);
        let handle = tokio::spawn(async move { pool.run(shutdown_rx).await });
        *self.task.lock() = Some(handle);
        true
    }

    async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!(
            pool_id = %self.id,
            concurrency = self.config.concurrency,
            queues = ?self.config.queues,
            "Starting worker pool"
        );

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!(pool_id = %self.id, "Received shutdown signal");
                    break;
                }

                permit = semaphore.clone().acquire_owned() => {
                    if let Ok(permit) = permit {
                        let dispatcher = self.dispatcher.clone();
                        let worker_id = format!("{}-{}", self.id, Uuid::new_v4());

                        tokio::spawn(async move {
                            dispatcher.drain(&worker_id).await;
                            drop(permit);
                        }.instrument(tracing::info_span!("worker", pool_id = %self.id)));
                    }
                }
            }

            tokio::time::sleep(self.config.poll_interval).await;
        }

        info!(pool_id = %self.id, "Waiting for workers to finish...");
        let drained = timeout(self.config.shutdown_timeout, async {
            while semaphore.available_permits() < self.config.concurrency {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await;
        if drained.is_err() {
            warn!(pool_id = %self.id, "Workers still busy after shutdown timeout");
        }

        self.running.store(false, Ordering::SeqCst);

        info!(
            pool_id = %self.id,
            processed = self.jobs_processed(),
            failed = self.jobs_failed(),
            "Worker pool stopped"
        );
    }

    /// Signals the pool to stop.
    pub fn stop(&self) {
        info!(pool_id = %self.id, "Stopping worker pool...");
        self.dispatcher.stopping.store(true, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
    }

    /// Stops the pool and waits for a spawned pool task to finish.
    pub async fn shutdown(&self) {
        self.stop();
        let task = self.task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!(pool_id = %self.id, error = %e, "Worker pool task panicked");
            }
        }
    }

    /// Check if the pool is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Get the number of jobs processed.
    pub fn jobs_processed(&self) -> u64 {
        self.dispatcher.jobs_processed.load(Ordering::Relaxed)
    }

    /// Get the number of jobs failed.
    pub fn jobs_failed(&self) -> u64 {
        self.dispatcher.jobs_failed.load(Ordering::Relaxed)
    }

    /// Get the pool ID.
    pub fn id(&self) -> &str {
        &self.id
    }
}
