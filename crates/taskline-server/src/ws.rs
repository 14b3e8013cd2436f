//! WebSocket surface: handshake identity, upgrade, and the per-connection
//! reader/writer loops.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};

use taskline_core::{defaults, UserId};
use taskline_hub::{Hub, Outbound, Session};

/// Shared state for the WebSocket surface.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<Hub>,
    pub identity: Arc<dyn IdentityResolver>,
    pub ws_connections: Arc<AtomicUsize>,
    pub queue_capacity: usize,
}

/// Query parameters supplied at connection time.
#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    #[serde(default, rename = "userId")]
    pub user_id: Option<i64>,
}

/// Handshake identity failure; rejected before the upgrade.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentityError {
    #[error("userId parameter required")]
    Missing,
    #[error("invalid userId")]
    Invalid,
}

/// Capability-check hook for handshake identity.
///
/// The default [`QueryIdentity`] trusts a caller-supplied `userId` and is a
/// development placeholder: production deployments substitute an
/// implementation that derives the user id from a verified access token.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, query: &WsQuery) -> Result<UserId, IdentityError>;
}

/// Reads the user id straight from the `userId` query parameter.
pub struct QueryIdentity;

impl IdentityResolver for QueryIdentity {
    fn resolve(&self, query: &WsQuery) -> Result<UserId, IdentityError> {
        match query.user_id {
            None => Err(IdentityError::Missing),
            Some(id) if id <= 0 => Err(IdentityError::Invalid),
            Some(id) => Ok(id),
        }
    }
}

/// WebSocket upgrade handler (GET /ws).
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Response {
    let user_id = match state.identity.resolve(&query) {
        Ok(user_id) => user_id,
        Err(e) => {
            debug!(error = %e, "Rejected WebSocket handshake");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }
    };
    ws.on_upgrade(move |socket| handle_connection(socket, state, user_id))
}

/// Bridge one upgraded connection to the Hub.
async fn handle_connection(socket: WebSocket, state: AppState, user_id: UserId) {
    let count = state.ws_connections.fetch_add(1, Ordering::Relaxed) + 1;
    info!(user_id, active = count, "WebSocket connection opened");

    let (session, outbound) = Session::new(user_id, state.queue_capacity);
    let session = Arc::new(session);
    state.hub.register(session.clone()).await;

    let (sender, receiver) = socket.split();
    let mut write_task = tokio::spawn(write_loop(sender, outbound));
    let mut read_task = tokio::spawn(read_loop(receiver));

    // Either loop ending is terminal for the session. Unregistering closes
    // the outbound queue, which lets a still-running writer flush its close
    // frame and exit on its own.
    tokio::select! {
        _ = &mut write_task => { read_task.abort(); }
        _ = &mut read_task => {}
    }
    state.hub.unregister(&session).await;

    let count = state.ws_connections.fetch_sub(1, Ordering::Relaxed) - 1;
    info!(user_id, active = count, "WebSocket connection closed");
}

/// Writer loop: flush envelopes, send keepalive pings, stop on queue close.
async fn write_loop(mut sender: SplitSink<WebSocket, Message>, mut outbound: Outbound) {
    let mut ping_interval =
        tokio::time::interval(Duration::from_secs(defaults::PING_INTERVAL_SECS));
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = outbound.closed.changed() => {
                let _ = sender.send(Message::Close(None)).await;
                break;
            }
            envelope = outbound.queue.recv() => match envelope {
                Some(envelope) => match serde_json::to_string(&envelope) {
                    Ok(json) => {
                        if sender.send(Message::Text(json)).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(event_id = %envelope.event_id, error = %e, "Failed to serialize envelope");
                    }
                },
                None => break,
            },
            _ = ping_interval.tick() => {
                if sender.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }
}

/// Reader loop: drain frames for liveness only. Any error, close frame, or
/// idle timeout is terminal for the session.
async fn read_loop(mut receiver: SplitStream<WebSocket>) {
    let idle = Duration::from_secs(defaults::READ_IDLE_TIMEOUT_SECS);
    loop {
        match tokio::time::timeout(idle, receiver.next()).await {
            Err(_) => {
                debug!("Read idle timeout, treating connection as dead");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(e))) => {
                debug!(error = %e, "WebSocket read error");
                break;
            }
            Ok(Some(Ok(Message::Close(_)))) => break,
            // Pongs and application messages only count as liveness; there
            // is no client-to-server protocol beyond that.
            Ok(Some(Ok(_))) => {}
        }
    }
}
