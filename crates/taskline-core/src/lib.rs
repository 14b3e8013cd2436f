//! # taskline-core
//!
//! Core types for the taskline realtime fan-out service.
//!
//! This crate provides the unified event envelope, the raw source event
//! shapes published by the task/team/auth services, and the pure
//! normalization step that maps one onto the other.

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod normalize;
pub mod raw;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{
    Envelope, EventData, EventKind, TaskEventData, TeamEventData, TeamMemberEventData,
    UserEventData, UserId,
};
pub use normalize::{normalize, NormalizeError};
pub use raw::{RawEvent, TOPICS};
