//! Notification envelope

use bd_core::traits::Id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Kinds of lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    ConstructionRequestCreated,
    ConstructionRequestRejected,
    ConstructionRequestApproved,
    ConstructionRequestFailed,
    RequestFailed,
    OrderCreated,
    OrderCreationFailed,
    OrderStarted,
    OrderFinished,
    ProjectDeliveryUpdated,
    ProjectProgressUpdated,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConstructionRequestCreated => "CONSTRUCTION_REQUEST_CREATED",
            Self::ConstructionRequestRejected => "CONSTRUCTION_REQUEST_REJECTED",
            Self::ConstructionRequestApproved => "CONSTRUCTION_REQUEST_APPROVED",
            Self::ConstructionRequestFailed => "CONSTRUCTION_REQUEST_FAILED",
            Self::RequestFailed => "REQUEST_FAILED",
            Self::OrderCreated => "ORDER_CREATED",
            Self::OrderCreationFailed => "ORDER_CREATION_FAILED",
            Self::OrderStarted => "ORDER_STARTED",
            Self::OrderFinished => "ORDER_FINISHED",
            Self::ProjectDeliveryUpdated => "PROJECT_DELIVERY_UPDATED",
            Self::ProjectProgressUpdated => "PROJECT_PROGRESS_UPDATED",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire and storage format: `{eventType, timestamp, payload, userId?}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEvent {
    pub id: Uuid,
    pub event_type: EventType,
    /// Set by the pipeline when the event enters it
    pub timestamp: Option<DateTime<Utc>>,
    pub payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Id>,
}

/// Payload persisted in place of the original after delivery gave up
pub fn delivery_failed_payload() -> Value {
    serde_json::json!({ "error": "Notification delivery failed" })
}

impl NotificationEvent {
    pub fn new(event_type: EventType, payload: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            timestamp: None,
            payload,
            user_id: None,
        }
    }

    pub fn for_user(mut self, user_id: Id) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn enrich(mut self, now: DateTime<Utc>) -> Self {
        self.timestamp = Some(now);
        self
    }

    pub fn degrade(mut self) -> Self {
        self.payload = delivery_failed_payload();
        self
    }

    pub fn is_degraded(&self) -> bool {
        self.payload == delivery_failed_payload()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let event = NotificationEvent::new(EventType::OrderCreated, serde_json::json!({"orderId": 3}))
            .for_user(7);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["eventType"], "ORDER_CREATED");
        assert_eq!(json["userId"], 7);
        assert_eq!(json["payload"]["orderId"], 3);

        let global = NotificationEvent::new(EventType::OrderStarted, Value::Null);
        let json = serde_json::to_value(&global).unwrap();
        assert!(json.get("userId").is_none());
    }

    #[test]
    fn test_degrade_replaces_payload() {
        let event = NotificationEvent::new(EventType::OrderFinished, serde_json::json!({"x": 1}))
            .degrade();
        assert!(event.is_degraded());
    }
}
