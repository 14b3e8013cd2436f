//! # taskline-hub
//!
//! The connection registry ("Hub") and per-client sessions.
//!
//! The Hub exclusively owns the user → session mapping; every read and write
//! goes through its methods. Sessions own their bounded outbound queue; the
//! Hub is the only producer and the session's writer loop the only consumer.

pub mod hub;
pub mod session;

pub use hub::Hub;
pub use session::{DeliverError, Outbound, Session};
