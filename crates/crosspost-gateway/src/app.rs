use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

/// State shared with the health endpoints.
#[derive(Default)]
pub struct HealthState {
    /// Set while the Telegram dispatcher is polling.
    pub bot_running: AtomicBool,
}

pub fn build_router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/", get(status_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `GET /`: service status for hosting platforms that probe the root path.
async fn status_handler(State(state): State<Arc<HealthState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "crosspost",
        "version": env!("CARGO_PKG_VERSION"),
        "bot_running": state.bot_running.load(Ordering::Relaxed),
    }))
}

/// `GET /health`: liveness probe.
async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// Serve the health endpoints until the process exits.
pub async fn serve(addr: SocketAddr, state: Arc<HealthState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "health endpoint listening");
    axum::serve(listener, build_router(state)).await
}
