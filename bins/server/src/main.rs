//! qcvault API Server
//!
//! Main entry point for the attachment ingestion service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use qcvault_api::registry::Registry;
use qcvault_api::{AppState, create_router};
use qcvault_core::attachment::{AttachmentService, IngestLimits, PolicyTable};
use qcvault_core::storage::{StorageConfig, StorageProvider, StorageService};
use qcvault_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qcvault=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;

    // Blob storage
    let provider = StorageProvider::try_from(&config.storage)?;
    let storage = StorageService::from_config(StorageConfig::new(provider))?;
    info!(provider = storage.provider_name(), "Blob storage configured");

    // Ingestion pipeline
    let limits = IngestLimits::from(&config.ingest);
    info!(
        max_payload_bytes = limits.max_payload_bytes,
        store_timeout_ms = config.ingest.store_timeout_ms,
        "Attachment ingestion configured"
    );
    let attachments = Arc::new(AttachmentService::new(
        Arc::new(storage),
        PolicyTable::standard(),
        limits,
    ));

    // Create application state
    let state = AppState::new(Arc::new(Registry::new()), attachments);

    // Create router
    let app = create_router(state, config.server.body_limit_bytes);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
