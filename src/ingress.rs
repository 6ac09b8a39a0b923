//! HTTP ingress
//!
//! - `GET /` → queue depth as plain text
//! - `GET /addPokemon/{lat}/{lon}` → enqueue a wild-only task
//! - `GET /addToQueue/{lat}/{lon}` → enqueue a static-only task

use crate::queue::{EnqueueError, ScanContext, ScanMode};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;

pub fn router(context: Arc<ScanContext>) -> Router {
    Router::new()
        .route("/", get(queue_depth))
        .route("/addPokemon/{lat}/{lon}", get(add_wild))
        .route("/addToQueue/{lat}/{lon}", get(add_static))
        .with_state(context)
}

/// Bind and serve until the listener fails
pub async fn serve(addr: SocketAddr, context: Arc<ScanContext>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("🌐 Ingress listening on {}", addr);
    axum::serve(listener, router(context)).await
}

async fn queue_depth(State(context): State<Arc<ScanContext>>) -> String {
    context.depth().to_string()
}

async fn add_wild(
    State(context): State<Arc<ScanContext>>,
    Path((lat, lon)): Path<(String, String)>,
) -> (StatusCode, String) {
    submit(&context, &lat, &lon, ScanMode::WildOnly)
}

async fn add_static(
    State(context): State<Arc<ScanContext>>,
    Path((lat, lon)): Path<(String, String)>,
) -> (StatusCode, String) {
    submit(&context, &lat, &lon, ScanMode::StaticOnly)
}

fn submit(context: &ScanContext, lat: &str, lon: &str, mode: ScanMode) -> (StatusCode, String) {
    match context.submit(lat, lon, mode) {
        Ok(depth) => (StatusCode::OK, format!("Queue is {}", depth)),
        Err(e @ EnqueueError::Duplicate { .. }) => (StatusCode::CONFLICT, e.to_string()),
        Err(e @ EnqueueError::Invalid(_)) => {
            log::debug!("Rejected request {}/{}: {}", lat, lon, e);
            (StatusCode::BAD_REQUEST, e.to_string())
        }
    }
}
