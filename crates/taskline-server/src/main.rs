//! taskline-server: realtime event fan-out for the taskline services.
//!
//! Consumes domain events from NATS topics, resolves target users against
//! the Team Directory, and delivers unified envelopes to connected
//! WebSocket clients. Delivery is best-effort and at-most-once by design.

mod config;
mod ws;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taskline_hub::Hub;
use taskline_ingest::{Dispatcher, HttpTeamDirectory, TeamDirectory};

use crate::config::Config;
use crate::ws::{AppState, QueryIdentity};

/// Build the HTTP router for the realtime surface.
fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws::ws_handler))
        // Permissive CORS is a development posture; deployments front this
        // service with an ingress that enforces origins.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe: reachable while the process accepts connections.
async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Initialize tracing with configurable output.
///
/// Environment variables:
///   LOG_FORMAT - "json" or "text" (default: "text")
///   RUST_LOG   - standard env filter
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "taskline_server=debug,taskline_hub=debug,taskline_ingest=debug,tower_http=debug".into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Resolves when the process receives SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env();
    info!(?config, "Starting realtime service");

    let hub = Arc::new(Hub::new());
    let state = AppState {
        hub: hub.clone(),
        identity: Arc::new(QueryIdentity),
        ws_connections: Arc::new(AtomicUsize::new(0)),
        queue_capacity: config.queue_capacity,
    };

    let dispatcher = if config.intake_enabled {
        info!(url = %config.nats_url, "Connecting to NATS");
        let client = async_nats::connect(&config.nats_url)
            .await
            .context("connecting to NATS")?;

        let directory: Arc<dyn TeamDirectory> =
            Arc::new(HttpTeamDirectory::new(config.team_api_url.clone())?);
        Some(Dispatcher::new(client, hub.clone(), directory).start())
    } else {
        info!("Event intake disabled, serving WebSocket surface only");
        None
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Realtime service listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving")?;

    info!("Shutting down realtime service");
    if let Some(dispatcher) = dispatcher {
        dispatcher.shutdown().await;
    }
    info!("Realtime service stopped");
    Ok(())
}
