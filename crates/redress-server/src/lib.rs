pub mod error;
pub mod routes;
pub mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};

use decision_agent::DecisionClient;
use redress_core::config::RedressConfig;

use crate::state::AppState;

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        // Pipeline entry points
        .route("/api/chat", post(routes::chat::chat))
        .route("/api/trigger-delay", post(routes::trigger::trigger_delay))
        // Dashboard reads
        .route("/api/graph", get(routes::graph::graph))
        .route("/api/orders", get(routes::graph::orders))
        // Activity feed (SSE)
        .route("/api/events", get(routes::events::sse_events))
        // Operational controls
        .route("/api/monitor/reset", post(routes::monitor::reset))
        .layer(cors)
        .with_state(state)
}

/// GET /api/health — liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "service": "redress" }))
}

/// Start the redress server: wire the component graph, spawn the monitor
/// loop, and serve until shutdown.
pub async fn serve(config: RedressConfig) -> anyhow::Result<()> {
    let decision = Arc::new(DecisionClient::new(config.decision.client_config())?);
    let port = config.server.port;
    let monitor_enabled = config.monitor.enabled;

    let state = AppState::build(config, decision);

    if monitor_enabled {
        tokio::spawn(state.monitor.clone().run());
    } else {
        tracing::info!("monitor loop disabled by configuration");
    }

    let app = build_router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("redress server listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
