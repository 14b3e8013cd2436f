//! Client session: one registered user connection and its outbound queue.

use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;
use tokio::sync::{mpsc, watch};

use taskline_core::{Envelope, UserId};

/// Delivery failure for a single session. Both variants mark the session
/// unhealthy; the Hub responds by evicting it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliverError {
    /// Outbound queue at capacity; the client is not draining fast enough.
    #[error("outbound queue full")]
    QueueFull,

    /// Session already closed.
    #[error("session closed")]
    Closed,
}

/// Receiving half of a session, consumed by the connection's writer loop.
///
/// `queue` yields envelopes to flush to the wire; `closed` flips to `true`
/// when the Hub closes the session (eviction or unregister), signaling the
/// writer loop to terminate.
pub struct Outbound {
    pub queue: mpsc::Receiver<Envelope>,
    pub closed: watch::Receiver<bool>,
}

/// Server-side representation of one live client connection.
///
/// Bound to exactly one user id for its lifetime. The outbound queue
/// capacity is fixed at creation; enqueueing never blocks.
#[derive(Debug)]
pub struct Session {
    user_id: UserId,
    tx: mpsc::Sender<Envelope>,
    close_tx: watch::Sender<bool>,
    closed: AtomicBool,
}

impl Session {
    /// Create a session and the outbound half its writer loop consumes.
    pub fn new(user_id: UserId, capacity: usize) -> (Self, Outbound) {
        let (tx, rx) = mpsc::channel(capacity);
        let (close_tx, close_rx) = watch::channel(false);
        (
            Self {
                user_id,
                tx,
                close_tx,
                closed: AtomicBool::new(false),
            },
            Outbound {
                queue: rx,
                closed: close_rx,
            },
        )
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Non-blocking enqueue of an envelope onto the outbound queue.
    ///
    /// Returns immediately regardless of queue state; the caller never waits
    /// on a slow client.
    pub fn try_deliver(&self, envelope: Envelope) -> Result<(), DeliverError> {
        if self.is_closed() {
            return Err(DeliverError::Closed);
        }
        match self.tx.try_send(envelope) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Full(_)) => Err(DeliverError::QueueFull),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(DeliverError::Closed),
        }
    }

    /// Close the outbound queue, signaling the writer loop to terminate.
    /// Idempotent.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.close_tx.send(true);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
