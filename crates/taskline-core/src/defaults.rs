//! Centralized default constants for the taskline realtime service.
//!
//! **This module is the single source of truth** for all shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP/WebSocket server port.
pub const SERVER_PORT: u16 = 8084;

/// Default bind host.
pub const SERVER_HOST: &str = "0.0.0.0";

// =============================================================================
// SESSIONS
// =============================================================================

/// Outbound queue capacity per client session.
///
/// Fixed at session creation. A full queue marks the session unhealthy and
/// triggers eviction rather than blocking the distribution path.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

/// Keepalive ping interval, in seconds. Must be shorter than
/// [`READ_IDLE_TIMEOUT_SECS`] so a healthy client always produces read
/// traffic (pongs) inside the idle window.
pub const PING_INTERVAL_SECS: u64 = 30;

/// Read idle timeout, in seconds. A connection that produces no frames
/// (including pongs) within this window is treated as dead.
pub const READ_IDLE_TIMEOUT_SECS: u64 = 60;

// =============================================================================
// EXTERNAL COLLABORATORS
// =============================================================================

/// Default NATS server URL for event intake.
pub const NATS_URL: &str = "nats://localhost:4222";

/// Default base URL for the Team Directory service.
pub const TEAM_API_URL: &str = "http://localhost:8083";

/// Request timeout for Team Directory lookups, in seconds. Bounds the
/// per-event synchronous call so a directory stall cannot wedge a topic
/// consumer indefinitely.
pub const DIRECTORY_TIMEOUT_SECS: u64 = 5;
