//! Helpers for handler tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use http_body_util::BodyExt;
use qcvault_core::attachment::{AttachmentService, IngestLimits, PolicyTable};
use qcvault_core::storage::StorageService;
use serde_json::Value;

use crate::AppState;
use crate::registry::Registry;

/// State over an empty registry and an in-memory blob store.
pub fn test_state() -> AppState {
    let store = Arc::new(StorageService::in_memory().expect("memory store"));
    let attachments = Arc::new(AttachmentService::new(
        store,
        PolicyTable::standard(),
        IngestLimits::default(),
    ));
    AppState::new(Arc::new(Registry::new()), attachments)
}

/// `POST uri` with a JSON body.
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Collects a response body.
pub async fn read_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should collect")
        .to_bytes()
        .to_vec()
}

/// Collects a response body as JSON.
pub async fn read_json(response: Response) -> Value {
    serde_json::from_slice(&read_bytes(response).await).expect("body should be JSON")
}
