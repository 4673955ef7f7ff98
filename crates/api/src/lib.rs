//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for entity registration and quality metrics
//! - The in-memory registry backing reference resolution and persistence
//! - JSON error responses

pub mod error;
pub mod registry;
pub mod routes;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use qcvault_core::attachment::AttachmentService;
use qcvault_core::quality_metric::QualityMetricService;
use qcvault_core::storage::StorageService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::registry::Registry;

/// Quality metric service as wired into the API.
pub type MetricService = QualityMetricService<Registry, StorageService>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registered entities and stored records.
    pub registry: Arc<Registry>,
    /// Quality metric service.
    pub quality_metrics: Arc<MetricService>,
}

impl AppState {
    /// Wires the services around `registry`.
    #[must_use]
    pub fn new(
        registry: Arc<Registry>,
        attachments: Arc<AttachmentService<StorageService>>,
    ) -> Self {
        let quality_metrics = Arc::new(QualityMetricService::new(
            Arc::clone(&registry),
            attachments,
        ));
        Self {
            registry,
            quality_metrics,
        }
    }
}

/// Creates the main application router.
///
/// `body_limit` caps request bodies; attachments travel inline so it must
/// exceed the largest accepted payload once base64-encoded.
pub fn create_router(state: AppState, body_limit: usize) -> Router {
    routes::api_routes()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
