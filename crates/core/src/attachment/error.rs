//! Attachment error types.

use qcvault_shared::AppError;
use thiserror::Error;

use super::types::{PipelineStage, ResourceKind};
use crate::payload::DataUriError;
use crate::storage::StorageError;

/// Attachment ingestion errors.
#[derive(Debug, Error)]
pub enum AttachmentError {
    /// `href` is not a decodable base64 data URI.
    #[error("malformed data URI: {0}")]
    MalformedDataUri(#[from] DataUriError),

    /// Payload larger than the configured maximum.
    #[error("payload too large: {size} bytes exceeds maximum {max} bytes")]
    PayloadTooLarge {
        /// Payload size (decoded, or estimated before decoding).
        size: u64,
        /// Maximum allowed size.
        max: u64,
    },

    /// Payload decoded to zero bytes.
    #[error("attachment payload is empty")]
    EmptyPayload,

    /// Filename cannot be echoed back in a download header.
    #[error("invalid filename: {filename:?}")]
    InvalidFilename {
        /// Submitted filename.
        filename: String,
    },

    /// Filename extension not allowed for the resource.
    #[error("unsupported file extension: {filename}")]
    UnsupportedExtension {
        /// Submitted filename.
        filename: String,
    },

    /// Declared type disagrees with what was found.
    #[error("declared type '{declared}' does not match {found}")]
    TypeMismatch {
        /// Declared MIME type.
        declared: String,
        /// Description of the conflicting evidence.
        found: String,
    },

    /// No policy registered for the resource kind.
    #[error("no attachment policy for {0}")]
    NoPolicy(ResourceKind),

    /// Blob store did not answer within the configured timeout.
    #[error("blob store timed out after {after_ms} ms")]
    StoreTimeout {
        /// Timeout that elapsed.
        after_ms: u64,
    },

    /// Blob store refused or failed the write.
    #[error("blob store unavailable: {0}")]
    StoreUnavailable(#[source] StorageError),
}

impl AttachmentError {
    /// Create a payload too large error.
    #[must_use]
    pub fn payload_too_large(size: u64, max: u64) -> Self {
        Self::PayloadTooLarge { size, max }
    }

    /// Create an invalid filename error.
    #[must_use]
    pub fn invalid_filename(filename: impl Into<String>) -> Self {
        Self::InvalidFilename {
            filename: filename.into(),
        }
    }

    /// Create an unsupported extension error.
    #[must_use]
    pub fn unsupported_extension(filename: impl Into<String>) -> Self {
        Self::UnsupportedExtension {
            filename: filename.into(),
        }
    }

    /// Create a type mismatch error.
    #[must_use]
    pub fn type_mismatch(declared: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            declared: declared.into(),
            found: found.into(),
        }
    }

    /// Stage of the pipeline that rejected the attachment.
    #[must_use]
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::MalformedDataUri(_) | Self::PayloadTooLarge { .. } => PipelineStage::Decode,
            Self::EmptyPayload
            | Self::InvalidFilename { .. }
            | Self::UnsupportedExtension { .. }
            | Self::TypeMismatch { .. }
            | Self::NoPolicy(_) => PipelineStage::Validate,
            Self::StoreTimeout { .. } | Self::StoreUnavailable(_) => PipelineStage::Store,
        }
    }

    /// Whether resubmitting the same attachment may succeed.
    ///
    /// Decode and validation failures are deterministic; only store failures
    /// are transient.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.stage() == PipelineStage::Store
    }

    /// Stable snake-case code for API responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedDataUri(_) => "malformed_data_uri",
            Self::PayloadTooLarge { .. } => "payload_too_large",
            Self::EmptyPayload => "empty_payload",
            Self::InvalidFilename { .. } => "invalid_filename",
            Self::UnsupportedExtension { .. } => "unsupported_extension",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::NoPolicy(_) => "no_policy",
            Self::StoreTimeout { .. } => "store_timeout",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl From<AttachmentError> for AppError {
    fn from(err: AttachmentError) -> Self {
        let message = err.to_string();
        match err {
            AttachmentError::MalformedDataUri(_)
            | AttachmentError::EmptyPayload
            | AttachmentError::InvalidFilename { .. }
            | AttachmentError::UnsupportedExtension { .. }
            | AttachmentError::TypeMismatch { .. } => Self::Validation(message),
            AttachmentError::PayloadTooLarge { .. } => Self::PayloadTooLarge(message),
            AttachmentError::NoPolicy(_) => Self::Internal(message),
            AttachmentError::StoreTimeout { .. } => Self::Timeout(message),
            AttachmentError::StoreUnavailable(_) => Self::ServiceUnavailable(message),
        }
    }
}
