//! Structured logging field name constants for taskline-realtime.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, degraded fan-out or dropped delivery |
//! | INFO  | Lifecycle events (startup, shutdown, connect/disconnect) |
//! | DEBUG | Decision points, per-event dispatch detail |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "hub", "intake", "resolver", "server"
pub const SUBSYSTEM: &str = "subsystem";

/// User ID a session or delivery relates to.
pub const USER_ID: &str = "user_id";

/// Team ID an event or directory lookup relates to.
pub const TEAM_ID: &str = "team_id";

// ─── Event fields ──────────────────────────────────────────────────────────

/// Envelope event ID (UUIDv7).
pub const EVENT_ID: &str = "event_id";

/// Namespaced event type (e.g. "task.updated").
pub const EVENT_TYPE: &str = "event_type";

/// Inbound topic a message arrived on.
pub const TOPIC: &str = "topic";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Number of currently registered sessions.
pub const CONNECTED: &str = "connected";

/// Number of target users computed for an event.
pub const TARGET_COUNT: &str = "target_count";

/// Number of sessions an envelope was actually enqueued to.
pub const DELIVERED: &str = "delivered";
