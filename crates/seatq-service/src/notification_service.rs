//! Notification service trait definition.

use crate::jobs::PushNotification;
use async_trait::async_trait;
use seatq_core::{Interface, SeatqError, SeatqResult};
use seatq_jobs::JobId;
use serde_json::Value;

/// Push notification service trait.
#[async_trait]
pub trait NotificationService: Interface + Send + Sync {
    /// Enqueues one job per notification and returns their IDs in order.
    ///
    /// Stops at the first job that cannot be saved.
    async fn create_jobs(&self, jobs: Vec<PushNotification>) -> SeatqResult<Vec<JobId>>;

    /// Starts the notification worker pool. Returns false if it was already running.
    fn start_processing(&self) -> bool;
}

/// Reads a batch of notification jobs from a JSON body.
pub fn parse_notification_jobs(body: Value) -> SeatqResult<Vec<PushNotification>> {
    let Value::Array(items) = body else {
        return Err(SeatqError::validation("Jobs is not an array"));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| {
                SeatqError::validation(format!("Invalid notification job: item {}: {}", index, e))
            })
        })
        .collect()
}
