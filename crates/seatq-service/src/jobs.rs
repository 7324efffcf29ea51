//! Job types handled by the services.

use seatq_jobs::Job;
use serde::{Deserialize, Serialize};

/// Takes one seat. Carries no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReserveSeat;

impl Job for ReserveSeat {
    const NAME: &'static str = "reserve_seat";
    const QUEUE: &'static str = "reserve_seat";
}

/// Push notification sent to a phone number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushNotification {
    /// Destination phone number.
    pub phone_number: String,
    /// Message body.
    pub message: String,
}

impl Job for PushNotification {
    const NAME: &'static str = "push_notification_code";
    const QUEUE: &'static str = "push_notification_code";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_notification_wire_format() {
        let job: PushNotification = serde_json::from_str(
            r#"{"phoneNumber": "4153518780", "message": "This is the code 1234 to verify your account"}"#,
        )
        .unwrap();
        assert_eq!(job.phone_number, "4153518780");

        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["phoneNumber"], "4153518780");
        assert!(json.get("phone_number").is_none());
    }

    #[test]
    fn test_job_names() {
        assert_eq!(ReserveSeat::NAME, "reserve_seat");
        assert_eq!(PushNotification::QUEUE, "push_notification_code");
    }
}
