//! Real-time notification payloads pushed over WebSocket.
//!
//! Payloads are ephemeral: they are not persisted and have no delivery
//! guarantee.

use serde::{Deserialize, Serialize};

/// Event name every notification frame is emitted under.
pub const NOTIFICATION_EVENT: &str = "notificateNewRequest";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    NewRequest,
    AcceptedRequest,
    DeclinedRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub skill_name: String,
    /// Display name of the user who triggered the notification.
    pub sender: String,
}

/// The frame written to the socket: `{"event": ..., "data": ...}`.
#[derive(Debug, Serialize)]
pub struct NotificationFrame<'a> {
    pub event: &'static str,
    pub data: &'a NotificationPayload,
}

impl NotificationPayload {
    pub fn new(
        kind: NotificationType,
        skill_name: impl Into<String>,
        sender: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            skill_name: skill_name.into(),
            sender: sender.into(),
        }
    }

    pub fn frame(&self) -> NotificationFrame<'_> {
        NotificationFrame {
            event: NOTIFICATION_EVENT,
            data: self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_uses_wire_field_names() {
        let payload = NotificationPayload::new(NotificationType::NewRequest, "Guitar", "Alex");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "new_request", "skillName": "Guitar", "sender": "Alex" })
        );
    }

    #[test]
    fn frame_wraps_payload_under_event_name() {
        let payload = NotificationPayload::new(NotificationType::DeclinedRequest, "Chess", "Ivan");
        let json = serde_json::to_value(payload.frame()).unwrap();
        assert_eq!(json["event"], NOTIFICATION_EVENT);
        assert_eq!(json["data"]["type"], "declined_request");
    }
}
