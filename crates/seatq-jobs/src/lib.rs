//! Seatq Jobs - Job Queue and Workers
//!
//! A thin job queue client over Redis data structures with:
//! - Typed job definitions with serde serialization
//! - First-in first-out ordering inside each named queue
//! - Lifecycle events (progress, completed, failed) routed to each job's handles
//! - Bounded retention of finished job records
//! - Worker pools with bounded concurrency and per-job timeouts
//! - An in-memory backend with the same semantics
//!
//! Jobs are never retried. A failed job keeps its error and stays failed.
//!
//! # Example
//!
//! ```rust,ignore
//! use seatq_jobs::prelude::*;
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct SendSms {
//!     phone_number: String,
//! }
//!
//! impl Job for SendSms {
//!     const NAME: &'static str = "send_sms";
//!     const QUEUE: &'static str = "sms";
//! }
//!
//! pool.register::<SendSms, _, _>(|job, ctx| async move {
//!     ctx.progress(1, 1);
//!     Ok(())
//! });
//!
//! queue
//!     .enqueue(SendSms { phone_number: "4153518743".into() })
//!     .await?
//!     .on_complete(|id| tracing::info!("sms job {id} completed"))
//!     .watch();
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod job;
pub mod memory;
pub mod queue;
pub mod redis;
pub mod worker;

pub use config::{Retention, WorkerPoolConfig};
pub use error::{JobError, JobResult};
pub use events::{JobEventKind, JobEvents, JobHandle};
pub use job::{Job, JobContext, JobData, JobId, JobInfo, JobStatus};
pub use memory::MemoryJobQueue;
pub use queue::{JobQueue, JobQueueExt, QueueStats};
pub use redis::RedisJobQueue;
pub use worker::{JobHandler, WorkerPool};

/// Re-export commonly used traits
pub mod prelude {
    pub use crate::job::{Job, JobStatus};
    pub use crate::queue::{JobQueue, JobQueueExt};
    pub use crate::{JobContext, JobError, JobId, JobResult};
}
