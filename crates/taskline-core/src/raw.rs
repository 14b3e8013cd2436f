//! Raw source events as published by the task/team/auth services.
//!
//! Each inbound topic carries JSON whose fields are a family-specific subset
//! of [`RawEvent`]. Decoding into the superset union keeps the intake path
//! uniform; the normalizer then projects out exactly the fields its family
//! defines and discards the rest. A `RawEvent` is constructed once per
//! message, consumed by normalization and recipient resolution, and never
//! retained.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::events::UserId;

/// Inbound topic names, one intake consumer per entry.
pub const TOPICS: &[&str] = &[
    "task.created",
    "task.updated",
    "task.deleted",
    "task.completed",
    "team.created",
    "team.updated",
    "team.deleted",
    "team.member_added",
    "team.member_removed",
    "team.member_role_updated",
    "user.created",
];

/// Superset union of every field any inbound event type may carry.
///
/// Numeric ids default to 0 when absent (the publishing services omit fields
/// that do not apply to the event family); 0 is never a valid user or team
/// id, so downstream code treats it as "not present".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Namespaced type discriminant, e.g. `"task.updated"`. Kept as a string
    /// here so an unknown discriminant decodes cleanly and can be rejected
    /// with its original value in the log line.
    pub event_type: String,
    #[serde(default)]
    pub task_id: i64,
    #[serde(default)]
    pub team_id: i64,
    #[serde(default)]
    pub actor_id: UserId,
    #[serde(default)]
    pub creator_id: UserId,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    #[serde(default)]
    pub user_id: UserId,
    #[serde(default)]
    pub owner_id: UserId,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Free-form payload; the normalizer extracts known keys per family.
    #[serde(default)]
    pub payload: Option<Value>,
}

impl RawEvent {
    /// Decode a raw event from an inbound message body.
    pub fn from_json(bytes: &[u8]) -> crate::Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| crate::Error::Decode(e.to_string()))
    }

    /// Look up a string field in the free-form payload.
    pub fn payload_str(&self, key: &str) -> Option<String> {
        self.payload
            .as_ref()
            .and_then(|p| p.get(key))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Look up a boolean field in the free-form payload.
    pub fn payload_bool(&self, key: &str) -> Option<bool> {
        self.payload
            .as_ref()
            .and_then(|p| p.get(key))
            .and_then(Value::as_bool)
    }
}
