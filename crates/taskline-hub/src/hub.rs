//! Connection registry: the authoritative user → session mapping.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use taskline_core::{Envelope, UserId};

use crate::session::{DeliverError, Session};

/// Registry of live client connections with targeted, best-effort delivery.
///
/// At most one live session per user id: registering a replacement evicts
/// (closes) the prior session first. Registration and eviction take the
/// write path; broadcast lookups take the read path. No network write ever
/// happens under the lock; delivery only hands the envelope to the
/// session's queue.
#[derive(Debug, Default)]
pub struct Hub {
    sessions: RwLock<HashMap<UserId, Arc<Session>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session, evicting any existing session for the same user.
    pub async fn register(&self, session: Arc<Session>) {
        let user_id = session.user_id();
        let (evicted, connected) = {
            let mut sessions = self.sessions.write().await;
            let old = sessions.insert(user_id, session);
            (old, sessions.len())
        };
        if let Some(old) = evicted {
            old.close();
            debug!(user_id, "Evicted prior session for reconnecting user");
        }
        info!(user_id, connected, "Client connected");
    }

    /// Remove a session if it is still the one registered for its user.
    ///
    /// Idempotent, and identity-checked: an evicted session's late
    /// unregister (its loops winding down) never removes the replacement
    /// session registered since. Always closes the given session's queue.
    pub async fn unregister(&self, session: &Arc<Session>) {
        let user_id = session.user_id();
        let (removed, connected) = {
            let mut sessions = self.sessions.write().await;
            let removed = match sessions.get(&user_id) {
                Some(current) if Arc::ptr_eq(current, session) => {
                    sessions.remove(&user_id);
                    true
                }
                _ => false,
            };
            (removed, sessions.len())
        };
        session.close();
        if removed {
            info!(user_id, connected, "Client disconnected");
        }
    }

    /// Deliver an envelope to each currently-connected user in `user_ids`.
    ///
    /// Non-blocking and at-most-once: users without a session are skipped; a
    /// session whose queue is full or closed is evicted after the delivery
    /// loop. Returns the number of sessions the envelope was enqueued to.
    pub async fn broadcast_to_users(&self, envelope: &Envelope, user_ids: &[UserId]) -> usize {
        let targets: Vec<Arc<Session>> = {
            let sessions = self.sessions.read().await;
            user_ids
                .iter()
                .filter_map(|id| sessions.get(id).cloned())
                .collect()
        };

        let mut delivered = 0usize;
        let mut evicted: Vec<Arc<Session>> = Vec::new();
        for session in targets {
            match session.try_deliver(envelope.clone()) {
                Ok(()) => delivered += 1,
                Err(DeliverError::QueueFull) => {
                    warn!(
                        user_id = session.user_id(),
                        event_type = %envelope.kind,
                        "Outbound queue full, evicting session"
                    );
                    evicted.push(session);
                }
                Err(DeliverError::Closed) => {
                    debug!(
                        user_id = session.user_id(),
                        "Session closed during broadcast, evicting"
                    );
                    evicted.push(session);
                }
            }
        }

        for session in &evicted {
            self.unregister(session).await;
        }

        debug!(
            event_id = %envelope.event_id,
            event_type = %envelope.kind,
            target_count = user_ids.len(),
            delivered,
            "Broadcast complete"
        );
        delivered
    }

    /// Number of currently registered sessions.
    pub async fn connected_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether a user currently has a live session.
    pub async fn is_connected(&self, user_id: UserId) -> bool {
        self.sessions.read().await.contains_key(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskline_core::{EventData, EventKind, TaskEventData};

    use crate::session::Outbound;

    fn test_envelope() -> Envelope {
        Envelope::new(
            EventKind::TaskUpdated,
            7,
            4,
            Utc::now(),
            EventData::Task(TaskEventData {
                task_id: 12,
                creator_id: 4,
                assignee_id: Some(5),
                title: None,
                description: None,
                completed: None,
                priority: None,
                due: None,
            }),
        )
    }

    fn connect(user_id: UserId, capacity: usize) -> (Arc<Session>, Outbound) {
        let (session, outbound) = Session::new(user_id, capacity);
        (Arc::new(session), outbound)
    }

    #[tokio::test]
    async fn test_register_replaces_and_closes_prior_session() {
        let hub = Hub::new();
        let (first, _rx1) = connect(1, 4);
        let (second, _rx2) = connect(1, 4);

        hub.register(first.clone()).await;
        hub.register(second.clone()).await;

        // Exactly one session mapped to the user, and the first is closed.
        assert_eq!(hub.connected_count().await, 1);
        assert!(first.is_closed());
        assert!(!second.is_closed());

        // The replacement receives broadcasts; the evicted one cannot.
        let delivered = hub.broadcast_to_users(&test_envelope(), &[1]).await;
        assert_eq!(delivered, 1);
        assert!(hub.is_connected(1).await);
    }

    #[tokio::test]
    async fn test_unregister_is_idempotent() {
        let hub = Hub::new();
        let (session, _rx) = connect(1, 4);
        let (other, _rx2) = connect(2, 4);

        hub.register(session.clone()).await;
        hub.register(other.clone()).await;

        hub.unregister(&session).await;
        hub.unregister(&session).await;

        assert_eq!(hub.connected_count().await, 1);
        assert!(hub.is_connected(2).await);
        assert!(!other.is_closed());
    }

    #[tokio::test]
    async fn test_stale_unregister_keeps_replacement() {
        let hub = Hub::new();
        let (first, _rx1) = connect(1, 4);
        let (second, _rx2) = connect(1, 4);

        hub.register(first.clone()).await;
        hub.register(second.clone()).await;

        // The evicted session's loops wind down and unregister late.
        hub.unregister(&first).await;

        assert!(hub.is_connected(1).await);
        assert!(!second.is_closed());
    }

    #[tokio::test]
    async fn test_broadcast_targets_only_listed_users() {
        let hub = Hub::new();
        let (a, mut rx_a) = connect(1, 4);
        let (b, mut rx_b) = connect(2, 4);
        let (c, mut rx_c) = connect(3, 4);
        hub.register(a).await;
        hub.register(b).await;
        hub.register(c).await;

        let delivered = hub.broadcast_to_users(&test_envelope(), &[1, 3]).await;
        assert_eq!(delivered, 2);

        assert!(rx_a.queue.try_recv().is_ok());
        assert!(rx_b.queue.try_recv().is_err());
        assert!(rx_c.queue.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_skips_unconnected_users() {
        let hub = Hub::new();
        let (session, mut rx) = connect(1, 4);
        hub.register(session).await;

        // 42 and 99 have no sessions; delivery to 1 still succeeds.
        let delivered = hub.broadcast_to_users(&test_envelope(), &[42, 1, 99]).await;
        assert_eq!(delivered, 1);
        assert!(rx.queue.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_queue_overflow_evicts_without_blocking() {
        let hub = Hub::new();
        let (slow, _rx) = connect(1, 2);
        let (healthy, mut healthy_rx) = connect(2, 4);
        hub.register(slow.clone()).await;
        hub.register(healthy).await;

        // Fill the slow session's queue to capacity.
        slow.try_deliver(test_envelope()).unwrap();
        slow.try_deliver(test_envelope()).unwrap();

        // One more broadcast: returns promptly, evicts the stuck session,
        // still delivers to the healthy one.
        let delivered = hub.broadcast_to_users(&test_envelope(), &[1, 2]).await;
        assert_eq!(delivered, 1);
        assert!(!hub.is_connected(1).await);
        assert!(slow.is_closed());
        assert!(hub.is_connected(2).await);
        assert!(healthy_rx.queue.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_broadcast_to_no_targets_is_noop() {
        let hub = Hub::new();
        let delivered = hub.broadcast_to_users(&test_envelope(), &[]).await;
        assert_eq!(delivered, 0);
    }
}
