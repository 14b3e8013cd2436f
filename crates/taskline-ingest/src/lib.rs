//! # taskline-ingest
//!
//! The intake side of the realtime service: per-topic consumers that decode
//! published domain events, resolve the target user set, and hand envelopes
//! to the Hub for delivery.
//!
//! Failure policy is fire-and-forget throughout: a bad message, a directory
//! outage, or a stuck client never surfaces an error to the publishing side
//! and never halts another topic or connection.

pub mod directory;
pub mod dispatcher;
pub mod intake;
pub mod resolver;

pub use directory::{HttpTeamDirectory, TeamDirectory, TeamMember};
pub use dispatcher::{Dispatcher, DispatcherHandle};
pub use intake::EventIntake;
pub use resolver::RecipientResolver;
