//! Liveness check for load balancers and the deploy pipeline.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::AppState;

/// Service status with the optional collaborators that are wired in.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `ok` while the process serves requests.
    pub status: &'static str,
    /// Service name.
    pub service: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Whether uploads can be stored.
    pub storage_configured: bool,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "ringbook",
        version: env!("CARGO_PKG_VERSION"),
        storage_configured: state.storage.is_some(),
    })
}

/// GET /health, outside the auth layer.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
