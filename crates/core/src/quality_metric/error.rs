//! Quality metric error types.

use qcvault_shared::AppError;
use thiserror::Error;
use uuid::Uuid;

use super::types::EntityRef;
use crate::attachment::{AttachmentError, PipelineStage};
use crate::storage::StorageError;

/// Errors raised while accepting or serving quality metrics.
#[derive(Debug, Error)]
pub enum QualityMetricError {
    /// A referenced entity is not registered.
    #[error("unresolved reference: {0}")]
    UnresolvedReference(EntityRef),

    /// The record is structurally invalid.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// The attachment was rejected or could not be stored.
    #[error(transparent)]
    Attachment(#[from] AttachmentError),

    /// Quality metric not found.
    #[error("quality metric {0} not found")]
    NotFound(Uuid),

    /// The record has no attachment with that filename.
    #[error("quality metric {id} has no attachment named '{filename}'")]
    AttachmentNotFound {
        /// Record id.
        id: Uuid,
        /// Requested filename.
        filename: String,
    },

    /// Reading a stored attachment failed.
    #[error("attachment read failed: {0}")]
    Storage(#[from] StorageError),

    /// The repository failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl QualityMetricError {
    /// Create an invalid record error.
    #[must_use]
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Attachment pipeline stage, when the attachment caused the failure.
    #[must_use]
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            Self::Attachment(err) => Some(err.stage()),
            _ => None,
        }
    }

    /// Stable snake-case code for API responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnresolvedReference(_) => "unresolved_reference",
            Self::InvalidRecord(_) => "invalid_record",
            Self::Attachment(err) => err.code(),
            Self::NotFound(_) | Self::AttachmentNotFound { .. } => "not_found",
            Self::Storage(StorageError::NotFound { .. }) => "blob_not_found",
            Self::Storage(StorageError::Integrity { .. }) => "blob_corrupted",
            Self::Storage(_) => "storage_error",
            Self::Repository(_) => "repository_error",
        }
    }
}

impl From<QualityMetricError> for AppError {
    fn from(err: QualityMetricError) -> Self {
        let message = err.to_string();
        match err {
            QualityMetricError::UnresolvedReference(_) | QualityMetricError::InvalidRecord(_) => {
                Self::Validation(message)
            }
            QualityMetricError::Attachment(err) => err.into(),
            QualityMetricError::NotFound(_) | QualityMetricError::AttachmentNotFound { .. } => {
                Self::NotFound(message)
            }
            QualityMetricError::Storage(StorageError::Operation(_)) => {
                Self::ServiceUnavailable(message)
            }
            QualityMetricError::Storage(_) | QualityMetricError::Repository(_) => {
                Self::Internal(message)
            }
        }
    }
}
