//! Attachment ingestion pipeline: decode, sniff, validate, store.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use qcvault_shared::IngestConfig;
use tracing::{debug, error};

use super::error::AttachmentError;
use super::policy::PolicyTable;
use super::types::{Attachment, ResourceKind, StoredAttachment, ValidatedAttachment};
use super::validator::{AttachmentCandidate, normalize_mime, validate};
use crate::payload;
use crate::sniff::sniff;
use crate::storage::{BlobRef, BlobStore, StorageError};

/// Limits applied while ingesting one attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestLimits {
    /// Largest decoded payload accepted.
    pub max_payload_bytes: u64,
    /// How long a blob write may take.
    pub store_timeout: Duration,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self::from(&IngestConfig::default())
    }
}

impl From<&IngestConfig> for IngestLimits {
    fn from(config: &IngestConfig) -> Self {
        Self {
            max_payload_bytes: config.max_payload_bytes,
            store_timeout: Duration::from_millis(config.store_timeout_ms),
        }
    }
}

/// Turns submitted attachments into stored blobs.
pub struct AttachmentService<S: BlobStore> {
    store: Arc<S>,
    policies: PolicyTable,
    limits: IngestLimits,
}

impl<S: BlobStore> AttachmentService<S> {
    /// Create a new attachment service.
    #[must_use]
    pub fn new(store: Arc<S>, policies: PolicyTable, limits: IngestLimits) -> Self {
        Self {
            store,
            policies,
            limits,
        }
    }

    /// Limits in effect.
    #[must_use]
    pub fn limits(&self) -> IngestLimits {
        self.limits
    }

    /// Decodes and validates `attachment` without touching the store.
    ///
    /// # Errors
    ///
    /// Returns the first decode or validation failure.
    pub fn prepare(
        &self,
        kind: ResourceKind,
        attachment: &Attachment,
    ) -> Result<ValidatedAttachment, AttachmentError> {
        let policy = self
            .policies
            .get(kind)
            .ok_or(AttachmentError::NoPolicy(kind))?;
        let max = self.limits.max_payload_bytes;

        let estimated = payload::estimated_decoded_len(&attachment.href);
        if estimated > max {
            return Err(AttachmentError::payload_too_large(estimated, max));
        }

        let decoded = payload::decode(&attachment.href)?;
        let size = decoded.len() as u64;
        if size > max {
            return Err(AttachmentError::payload_too_large(size, max));
        }
        debug!(
            resource = %kind,
            download = %attachment.download,
            size,
            uri_type = %decoded.mime_type,
            "attachment decoded"
        );

        let sniffed = sniff(&decoded.bytes);
        debug!(
            download = %attachment.download,
            detected_kind = %sniffed.detected_kind,
            confidence = sniffed.confidence,
            "attachment sniffed"
        );

        let candidate = AttachmentCandidate {
            download: &attachment.download,
            declared_type: &attachment.mime_type,
            uri_type: &decoded.mime_type,
            payload_len: decoded.len(),
            sniff: sniffed,
        };
        validate(&candidate, policy)?;

        Ok(ValidatedAttachment {
            download: attachment.download.clone(),
            mime_type: normalize_mime(&attachment.mime_type),
            bytes: decoded.bytes,
            sniff: sniffed,
        })
    }

    /// Runs the full pipeline and stores the payload.
    ///
    /// # Errors
    ///
    /// Returns the failing stage's error. Store failures and timeouts are
    /// reported as [`AttachmentError::StoreUnavailable`] and
    /// [`AttachmentError::StoreTimeout`].
    pub async fn ingest(
        &self,
        kind: ResourceKind,
        attachment: &Attachment,
    ) -> Result<StoredAttachment, AttachmentError> {
        let validated = self.prepare(kind, attachment)?;
        let blob = self
            .store_bytes(Bytes::from(validated.bytes), &validated.download)
            .await?;

        debug!(
            resource = %kind,
            download = %validated.download,
            key = %blob.key,
            "attachment stored"
        );

        Ok(StoredAttachment {
            href: StoredAttachment::download_href(&validated.download),
            download: validated.download,
            mime_type: validated.mime_type,
            size: blob.size,
            detected_kind: validated.sniff.detected_kind,
            blob,
        })
    }

    /// Reads back a stored payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob is missing, unreadable, or corrupted.
    pub async fn fetch(&self, blob: &BlobRef) -> Result<Bytes, StorageError> {
        self.store.get(blob).await
    }

    async fn store_bytes(
        &self,
        bytes: Bytes,
        download: &str,
    ) -> Result<BlobRef, AttachmentError> {
        let timeout = self.limits.store_timeout;
        match tokio::time::timeout(timeout, self.store.put(bytes, download)).await {
            Ok(Ok(blob)) => Ok(blob),
            Ok(Err(err)) => {
                error!(error = %err, download, "blob store write failed");
                Err(AttachmentError::StoreUnavailable(err))
            }
            Err(_) => {
                let after_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                error!(after_ms, download, "blob store write timed out");
                Err(AttachmentError::StoreTimeout { after_ms })
            }
        }
    }
}
