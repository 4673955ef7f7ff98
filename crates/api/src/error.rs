//! JSON error responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use qcvault_core::attachment::PipelineStage;
use qcvault_core::quality_metric::QualityMetricError;
use qcvault_shared::AppError;
use serde::Serialize;
use tracing::error;

/// Error body: `{ "error", "message", "stage"? }`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable error code.
    pub error: &'static str,
    /// Human readable message.
    pub message: String,
    /// Attachment pipeline stage that failed, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<PipelineStage>,
}

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    /// HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<QualityMetricError> for ApiError {
    fn from(err: QualityMetricError) -> Self {
        let code = err.code();
        let stage = err.stage();
        let mut message = err.to_string();
        let app = AppError::from(err);
        let status =
            StatusCode::from_u16(app.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %app, "request failed");
            message = "An error occurred".to_string();
        }

        Self {
            status,
            body: ErrorBody {
                error: code,
                message,
                stage,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
