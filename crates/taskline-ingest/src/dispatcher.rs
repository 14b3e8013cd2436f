//! Dispatcher: one consumer task per topic, one shared shutdown signal.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use taskline_core::TOPICS;
use taskline_hub::Hub;

use crate::directory::TeamDirectory;
use crate::intake::{run_topic_consumer, EventIntake};
use crate::resolver::RecipientResolver;

/// Wires intake → normalizer → resolver → Hub for every inbound topic.
pub struct Dispatcher {
    client: async_nats::Client,
    intake: Arc<EventIntake>,
}

impl Dispatcher {
    pub fn new(
        client: async_nats::Client,
        hub: Arc<Hub>,
        directory: Arc<dyn TeamDirectory>,
    ) -> Self {
        let intake = Arc::new(EventIntake::new(hub, RecipientResolver::new(directory)));
        Self { client, intake }
    }

    /// Spawn one consumer task per topic and return a shutdown handle.
    pub fn start(self) -> DispatcherHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handles = TOPICS
            .iter()
            .map(|topic| {
                let intake = self.intake.clone();
                let client = self.client.clone();
                let topic = topic.to_string();
                let shutdown = shutdown_rx.clone();
                tokio::spawn(async move {
                    if let Err(e) = run_topic_consumer(intake, client, topic.clone(), shutdown).await
                    {
                        error!(%topic, error = %e, "Topic consumer terminated");
                    }
                })
            })
            .collect();

        info!(topics = TOPICS.len(), "Dispatcher started");
        DispatcherHandle {
            shutdown_tx,
            handles,
        }
    }
}

/// Handle for shutting the dispatcher down and draining its consumers.
pub struct DispatcherHandle {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl DispatcherHandle {
    /// Signal every topic consumer to stop, then wait for them to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles {
            let _ = handle.await;
        }
        info!("Dispatcher stopped");
    }
}
