//! Per-topic event intake: decode, normalize, resolve, broadcast.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use taskline_core::{normalize, Error, RawEvent, Result};
use taskline_hub::Hub;

use crate::resolver::RecipientResolver;

/// The decode → normalize → resolve → broadcast pipeline for one message.
///
/// Shared by every topic consumer; holds no per-topic state, so consumers
/// stay independent of each other.
pub struct EventIntake {
    hub: Arc<Hub>,
    resolver: RecipientResolver,
}

impl EventIntake {
    pub fn new(hub: Arc<Hub>, resolver: RecipientResolver) -> Self {
        Self { hub, resolver }
    }

    /// Process one inbound message. Never fails: a poison message is logged
    /// and skipped so the topic's consumer keeps running.
    pub async fn handle_message(&self, topic: &str, payload: &[u8]) {
        let raw = match RawEvent::from_json(payload) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(topic, error = %e, "Skipping undecodable event");
                return;
            }
        };

        let envelope = match normalize(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(topic, error = %e, "Skipping event");
                return;
            }
        };

        let targets = self.resolver.resolve(&raw, envelope.kind).await;
        if targets.is_empty() {
            debug!(topic, event_type = %envelope.kind, "No target users, dropping event");
            return;
        }

        self.hub.broadcast_to_users(&envelope, &targets).await;
    }
}

/// Long-lived consumer for one topic.
///
/// Processes messages one at a time in arrival order. Exits promptly on the
/// shared shutdown signal or when the subscription closes; in-flight
/// processing finishes first.
pub async fn run_topic_consumer(
    intake: Arc<EventIntake>,
    client: async_nats::Client,
    topic: String,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let mut subscriber = client
        .subscribe(topic.clone())
        .await
        .map_err(|e| Error::Intake(e.to_string()))?;

    info!(%topic, "Topic consumer started");
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                info!(%topic, "Topic consumer stopping");
                break;
            }
            message = subscriber.next() => match message {
                Some(message) => intake.handle_message(&topic, &message.payload).await,
                None => {
                    warn!(%topic, "Subscription closed, topic consumer stopping");
                    break;
                }
            }
        }
    }
    Ok(())
}
