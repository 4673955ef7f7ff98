//! Registration of the entities quality metrics refer to.
//!
//! `POST /awards`, `/labs`, `/analysis_step_runs`, `/files`, `/replicates`.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use qcvault_core::quality_metric::EntityKind;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::AppState;

/// Registration request; the id is generated when omitted.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterEntityRequest {
    /// Id to register.
    pub uuid: Option<Uuid>,
}

/// Registration response.
#[derive(Debug, Serialize)]
pub struct RegisterEntityResponse {
    /// Registered id.
    pub uuid: Uuid,
    /// Entity kind.
    #[serde(rename = "@type")]
    pub kind: EntityKind,
}

/// Creates the entity registration routes.
pub fn routes() -> Router<AppState> {
    EntityKind::ALL
        .into_iter()
        .fold(Router::new(), |router, kind| {
            router.route(
                &format!("/{}", kind.collection()),
                post(
                    move |state: State<AppState>, body: Option<Json<RegisterEntityRequest>>| {
                        register(state, kind, body)
                    },
                ),
            )
        })
}

async fn register(
    State(state): State<AppState>,
    kind: EntityKind,
    body: Option<Json<RegisterEntityRequest>>,
) -> impl IntoResponse {
    let request = body.map(|Json(request)| request).unwrap_or_default();
    let uuid = state.registry.register(kind, request.uuid);
    info!(%uuid, kind = %kind, "entity registered");

    (
        StatusCode::CREATED,
        Json(RegisterEntityResponse { uuid, kind }),
    )
}
