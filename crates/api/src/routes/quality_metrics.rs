//! Quality metric routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use qcvault_core::attachment::ResourceKind;
use qcvault_core::quality_metric::{QualityMetricRecord, StoredQualityMetric};
use qcvault_shared::types::{PageRequest, PageResponse, QualityMetricId};

use crate::AppState;
use crate::error::ApiError;

/// Creates the quality metric routes.
pub fn routes() -> Router<AppState> {
    let collections = ResourceKind::ALL
        .into_iter()
        .fold(Router::new(), |router, kind| {
            router.route(
                &format!("/{}", kind.as_str()),
                post(
                    move |state: State<AppState>, record: Json<QualityMetricRecord>| {
                        create_metric(state, kind, record)
                    },
                ),
            )
        });

    collections
        .route("/quality_metrics", get(list_metrics))
        .route("/quality_metrics/{id}", get(get_metric))
        .route(
            "/quality_metrics/{id}/@@download/attachment/{filename}",
            get(download_attachment),
        )
}

/// POST `/generic_quality_metric`, `/micro_rna_quality_metric`
async fn create_metric(
    State(state): State<AppState>,
    kind: ResourceKind,
    Json(record): Json<QualityMetricRecord>,
) -> Result<(StatusCode, Json<StoredQualityMetric>), ApiError> {
    let metric = state.quality_metrics.create(kind, record).await?;
    Ok((StatusCode::CREATED, Json(metric)))
}

/// GET `/quality_metrics?page=&per_page=`
async fn list_metrics(
    State(state): State<AppState>,
    Query(page): Query<PageRequest>,
) -> Result<Json<PageResponse<StoredQualityMetric>>, ApiError> {
    Ok(Json(state.quality_metrics.list(page).await?))
}

/// GET `/quality_metrics/{id}`
async fn get_metric(
    State(state): State<AppState>,
    Path(id): Path<QualityMetricId>,
) -> Result<Json<StoredQualityMetric>, ApiError> {
    Ok(Json(state.quality_metrics.get(id).await?))
}

/// GET `/quality_metrics/{id}/@@download/attachment/{filename}`
async fn download_attachment(
    State(state): State<AppState>,
    Path((id, filename)): Path<(QualityMetricId, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let (attachment, bytes) = state.quality_metrics.download(id, &filename).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        attachment.download.replace(['"', '\\'], "_")
    );

    Ok((
        [
            (header::CONTENT_TYPE, attachment.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    ))
}
