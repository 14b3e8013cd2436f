//! Unified event envelope and typed payloads for realtime fan-out.
//!
//! Every domain event delivered to a connected client is wrapped in an
//! [`Envelope`], the canonical wire-ready record. The envelope carries
//! metadata (event ID, type, team scope, actor, timestamp) while the `data`
//! field holds the event-family-specific payload as a tagged union.
//!
//! ## Wire Format
//!
//! ```text
//! {"eventId":"019508a0-...","type":"task.updated","teamId":7,"actorId":4,
//!  "timestamp":"2026-08-24T10:00:00Z","data":{"taskId":12,"creatorId":4,...}}
//! ```
//!
//! The `type` field is the discriminant for `data`; the payload itself is
//! serialized untagged, matching what the publishing services' clients
//! already consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Authenticated user identifier. Positive for real users; never zero in a
/// registered session.
pub type UserId = i64;

/// Closed set of supported event types, dot-namespaced per family.
///
/// Unknown discriminants are rejected at decode time rather than passed
/// through as untyped blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TaskCreated,
    TaskUpdated,
    TaskDeleted,
    TaskCompleted,
    TeamCreated,
    TeamUpdated,
    TeamDeleted,
    TeamMemberAdded,
    TeamMemberRemoved,
    TeamMemberRoleUpdated,
    UserCreated,
}

impl EventKind {
    /// Returns the namespaced wire name (e.g. `"task.updated"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::TaskCreated => "task.created",
            EventKind::TaskUpdated => "task.updated",
            EventKind::TaskDeleted => "task.deleted",
            EventKind::TaskCompleted => "task.completed",
            EventKind::TeamCreated => "team.created",
            EventKind::TeamUpdated => "team.updated",
            EventKind::TeamDeleted => "team.deleted",
            EventKind::TeamMemberAdded => "team.member_added",
            EventKind::TeamMemberRemoved => "team.member_removed",
            EventKind::TeamMemberRoleUpdated => "team.member_role_updated",
            EventKind::UserCreated => "user.created",
        }
    }

    /// Parse a wire name into a kind. Returns `None` for anything outside
    /// the closed set.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "task.created" => Some(EventKind::TaskCreated),
            "task.updated" => Some(EventKind::TaskUpdated),
            "task.deleted" => Some(EventKind::TaskDeleted),
            "task.completed" => Some(EventKind::TaskCompleted),
            "team.created" => Some(EventKind::TeamCreated),
            "team.updated" => Some(EventKind::TeamUpdated),
            "team.deleted" => Some(EventKind::TeamDeleted),
            "team.member_added" => Some(EventKind::TeamMemberAdded),
            "team.member_removed" => Some(EventKind::TeamMemberRemoved),
            "team.member_role_updated" => Some(EventKind::TeamMemberRoleUpdated),
            "user.created" => Some(EventKind::UserCreated),
            _ => None,
        }
    }

    /// True for `task.*` events.
    pub fn is_task(&self) -> bool {
        matches!(
            self,
            EventKind::TaskCreated
                | EventKind::TaskUpdated
                | EventKind::TaskDeleted
                | EventKind::TaskCompleted
        )
    }

    /// True for `team.created|updated|deleted` (not membership changes).
    pub fn is_team(&self) -> bool {
        matches!(
            self,
            EventKind::TeamCreated | EventKind::TeamUpdated | EventKind::TeamDeleted
        )
    }

    /// True for `team.member_*` events.
    pub fn is_team_member(&self) -> bool {
        matches!(
            self,
            EventKind::TeamMemberAdded
                | EventKind::TeamMemberRemoved
                | EventKind::TeamMemberRoleUpdated
        )
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EventKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        EventKind::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown event type: {s}")))
    }
}

/// Task-specific payload delivered for `task.*` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEventData {
    pub task_id: i64,
    pub creator_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<String>,
}

/// Team-specific payload delivered for `team.created|updated|deleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamEventData {
    pub team_id: i64,
    pub owner_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Membership payload delivered for `team.member_*` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberEventData {
    pub team_id: i64,
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// User payload delivered for `user.created`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEventData {
    pub user_id: UserId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Event-family-specific payload, selected by the envelope's `type` field.
///
/// Serialized untagged: the discriminant already lives on the envelope, so
/// `data` carries only the family's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventData {
    Task(TaskEventData),
    Team(TeamEventData),
    TeamMember(TeamMemberEventData),
    User(UserEventData),
}

/// The canonical record delivered to connected clients.
///
/// Immutable once constructed. `event_id` is a UUIDv7, unique within a
/// process lifetime and time-ordered across emissions. `team_id` is 0 for
/// team-less/global events (`user.created`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Unique event identifier (UUIDv7 for temporal ordering).
    pub event_id: Uuid,
    /// Namespaced event type; doubles as the `data` discriminant.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Team scope, 0 for global events.
    pub team_id: i64,
    /// Who caused the event.
    pub actor_id: UserId,
    /// When the event occurred (UTC).
    pub timestamp: DateTime<Utc>,
    /// Family-specific payload.
    pub data: EventData,
}

impl Envelope {
    /// Construct an envelope with a freshly generated event ID.
    pub fn new(
        kind: EventKind,
        team_id: i64,
        actor_id: UserId,
        timestamp: DateTime<Utc>,
        data: EventData,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            kind,
            team_id,
            actor_id,
            timestamp,
            data,
        }
    }
}
