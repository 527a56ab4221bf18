//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes
//! - Authentication middleware
//! - Request extractors
//! - Error responses

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use ringbook_core::attachment::{AttachmentService, LlamaParseClient};
use ringbook_core::generator::{AnthropicClient, DraftSlots, EntryGenerator};
use ringbook_core::storage::StorageService;
use ringbook_shared::JwtService;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Upper bound on request bodies, attachments included.
pub const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for validating provider tokens.
    pub jwt_service: Arc<JwtService>,
    /// Journal entry generator.
    pub generator: Arc<EntryGenerator<AnthropicClient>>,
    /// Attachment intake; PDFs need a configured parser.
    pub attachments: Arc<AttachmentService<LlamaParseClient>>,
    /// Storage service for post attachments (optional).
    pub storage: Option<Arc<StorageService>>,
    /// Each user's latest candidate entry.
    pub drafts: Arc<DraftSlots>,
}

/// Creates the main application router.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

/// Any origin when none are configured, otherwise exactly the listed ones.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(parsed)
    }
}
