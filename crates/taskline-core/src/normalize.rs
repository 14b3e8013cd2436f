//! Pure normalization from raw source events to the unified envelope.
//!
//! One decoded JSON shape per topic family maps onto [`Envelope`]; the
//! projection extracts the payload fields relevant to that family and
//! discards everything else. Unknown event types are rejected; no envelope
//! is produced and no downstream delivery is attempted.

use chrono::Utc;
use thiserror::Error;

use crate::events::{
    Envelope, EventData, EventKind, TaskEventData, TeamEventData, TeamMemberEventData,
    UserEventData,
};
use crate::raw::RawEvent;

/// Normalization failure. Per-message, never fatal to the consumer.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("unknown event type: {0}")]
    UnknownEventType(String),
}

/// Map a raw source event onto the unified envelope for its family.
///
/// Pure: no I/O, no shared state. A missing timestamp falls back to the
/// normalization instant.
pub fn normalize(raw: &RawEvent) -> Result<Envelope, NormalizeError> {
    let kind = EventKind::parse(&raw.event_type)
        .ok_or_else(|| NormalizeError::UnknownEventType(raw.event_type.clone()))?;

    let timestamp = raw.timestamp.unwrap_or_else(Utc::now);

    let envelope = if kind.is_task() {
        Envelope::new(
            kind,
            raw.team_id,
            raw.actor_id,
            timestamp,
            EventData::Task(TaskEventData {
                task_id: raw.task_id,
                creator_id: raw.creator_id,
                assignee_id: raw.assignee_id,
                title: raw.payload_str("title"),
                description: raw.payload_str("description"),
                completed: raw.payload_bool("completed"),
                priority: raw.payload_str("priority"),
                due: raw.payload_str("due"),
            }),
        )
    } else if kind.is_team() {
        Envelope::new(
            kind,
            raw.team_id,
            raw.actor_id,
            timestamp,
            EventData::Team(TeamEventData {
                team_id: raw.team_id,
                owner_id: raw.owner_id,
                name: raw.payload_str("name"),
                description: raw.payload_str("description"),
            }),
        )
    } else if kind.is_team_member() {
        Envelope::new(
            kind,
            raw.team_id,
            raw.actor_id,
            timestamp,
            EventData::TeamMember(TeamMemberEventData {
                team_id: raw.team_id,
                user_id: raw.user_id,
                role: raw.role.clone(),
            }),
        )
    } else {
        // user.created: team-less (global scope), the user is the actor
        Envelope::new(
            kind,
            0,
            raw.user_id,
            timestamp,
            EventData::User(UserEventData {
                user_id: raw.user_id,
                email: raw.payload_str("email"),
                username: raw.payload_str("username"),
            }),
        )
    };

    Ok(envelope)
}
