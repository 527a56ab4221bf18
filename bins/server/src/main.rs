//! Ringbook API Server
//!
//! Main entry point for the Ringbook backend service.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ringbook_api::{AppState, create_router};
use ringbook_core::attachment::{AttachmentService, LlamaParseClient};
use ringbook_core::generator::{AnthropicClient, DraftSlots, EntryGenerator};
use ringbook_core::storage::{StorageConfig, StorageService};
use ringbook_db::connect_with_pool;
use ringbook_shared::{AppConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ringbook=debug,ringbook_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let jwt_service = JwtService::new(&config.auth);

    let generator = EntryGenerator::new(
        AnthropicClient::new(&config.llm),
        Duration::from_secs(config.llm.timeout_secs),
    );
    info!(model = %config.llm.model, timeout_secs = config.llm.timeout_secs, "Model endpoint configured");

    let parser = config.parser.as_ref().map(|p| Arc::new(LlamaParseClient::new(p)));
    if parser.is_none() {
        warn!("Document parser not configured; PDF attachments are disabled");
    }
    let attachments = AttachmentService::new(parser);

    let storage = match &config.storage {
        Some(settings) => {
            let service = StorageService::from_config(StorageConfig::from_settings(settings))?;
            info!(storage = ?service, "Object storage configured");
            Some(Arc::new(service))
        }
        None => {
            warn!("Object storage not configured; uploads are disabled");
            None
        }
    };

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        generator: Arc::new(generator),
        attachments: Arc::new(attachments),
        storage,
        drafts: Arc::new(DraftSlots::new()),
    };

    let app = create_router(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
