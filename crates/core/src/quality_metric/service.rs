//! Quality metric service: reference resolution, attachment ingestion and
//! persistence.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use qcvault_shared::types::{PageRequest, PageResponse, QualityMetricId};
use tracing::{info, warn};

use super::error::QualityMetricError;
use super::types::{EntityRef, MicroRnaMetrics, QualityMetricRecord, StoredQualityMetric};
use crate::attachment::{AttachmentService, ResourceKind, StoredAttachment};
use crate::storage::BlobStore;

/// A page of records and the total record count.
pub type ListResult = Result<(Vec<StoredQualityMetric>, u64), QualityMetricError>;

/// Repository trait for quality metric persistence and reference lookup.
///
/// Implemented by the API crate's in-memory registry.
pub trait QualityMetricRepository: Send + Sync {
    /// Whether the referenced entity is registered.
    fn reference_exists(
        &self,
        reference: EntityRef,
    ) -> impl std::future::Future<Output = Result<bool, QualityMetricError>> + Send;

    /// Persist a new record.
    fn create(
        &self,
        metric: StoredQualityMetric,
    ) -> impl std::future::Future<Output = Result<StoredQualityMetric, QualityMetricError>> + Send;

    /// Find a record by id.
    fn find_by_id(
        &self,
        id: QualityMetricId,
    ) -> impl std::future::Future<Output = Result<Option<StoredQualityMetric>, QualityMetricError>> + Send;

    /// One page of records ordered by creation time, plus the total count.
    fn list(&self, page: PageRequest) -> impl std::future::Future<Output = ListResult> + Send;
}

/// Quality metric service.
pub struct QualityMetricService<R: QualityMetricRepository, S: BlobStore> {
    repo: Arc<R>,
    attachments: Arc<AttachmentService<S>>,
}

impl<R: QualityMetricRepository, S: BlobStore> QualityMetricService<R, S> {
    /// Create a new quality metric service.
    #[must_use]
    pub fn new(repo: Arc<R>, attachments: Arc<AttachmentService<S>>) -> Self {
        Self { repo, attachments }
    }

    /// Accept a submitted record.
    ///
    /// Nothing is stored unless every check passes: the record is well formed,
    /// every reference resolves, and the attachment (if any) is accepted.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `quality_metric_of` is empty or micro-RNA fields are malformed
    /// - A referenced entity is not registered
    /// - The attachment fails decoding, validation or storage
    pub async fn create(
        &self,
        kind: ResourceKind,
        record: QualityMetricRecord,
    ) -> Result<StoredQualityMetric, QualityMetricError> {
        if let Some(key) = record.reserved_field() {
            return Err(QualityMetricError::invalid_record(format!(
                "field '{key}' is assigned by the server"
            )));
        }

        let mut references = record.references();
        if kind == ResourceKind::MicroRnaQualityMetric {
            let metrics = MicroRnaMetrics::from_fields(&record.fields)?;
            references.extend(metrics.references());
        }
        if record.quality_metric_of.is_empty() {
            return Err(QualityMetricError::invalid_record(
                "quality_metric_of must name at least one file",
            ));
        }

        self.resolve(&references).await?;

        let attachment = match &record.attachment {
            Some(attachment) => Some(
                self.attachments
                    .ingest(kind, attachment)
                    .await
                    .inspect_err(|err| {
                        warn!(
                            resource = %kind,
                            download = %attachment.download,
                            stage = err.stage().as_str(),
                            error = %err,
                            "attachment rejected"
                        );
                    })?,
            ),
            None => None,
        };

        let metric = StoredQualityMetric {
            uuid: QualityMetricId::new(),
            kind,
            award: record.award,
            lab: record.lab,
            step_run: record.step_run,
            quality_metric_of: record.quality_metric_of,
            name: record.name,
            attachment,
            date_created: Utc::now(),
            fields: record.fields,
        };
        let metric = self.repo.create(metric).await?;

        info!(
            id = %metric.uuid,
            resource = %kind,
            attachment = metric.attachment.as_ref().map(|a| a.download.as_str()),
            "quality metric created"
        );
        Ok(metric)
    }

    /// Get a record by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist.
    pub async fn get(&self, id: QualityMetricId) -> Result<StoredQualityMetric, QualityMetricError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(QualityMetricError::NotFound(id.into_inner()))
    }

    /// List records a page at a time.
    pub async fn list(
        &self,
        page: PageRequest,
    ) -> Result<PageResponse<StoredQualityMetric>, QualityMetricError> {
        let page = page.clamped();
        let (data, total) = self.repo.list(page).await?;
        Ok(PageResponse::new(data, page.page, page.per_page, total))
    }

    /// Read back the attachment named `filename` on record `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the record does not exist, has no attachment with
    /// that name, or the blob cannot be read.
    pub async fn download(
        &self,
        id: QualityMetricId,
        filename: &str,
    ) -> Result<(StoredAttachment, Bytes), QualityMetricError> {
        let metric = self.get(id).await?;
        let attachment = metric
            .attachment
            .filter(|a| a.download == filename)
            .ok_or_else(|| QualityMetricError::AttachmentNotFound {
                id: id.into_inner(),
                filename: filename.to_string(),
            })?;

        let bytes = self.attachments.fetch(&attachment.blob).await?;
        Ok((attachment, bytes))
    }

    async fn resolve(&self, references: &[EntityRef]) -> Result<(), QualityMetricError> {
        for reference in references {
            if !self.repo.reference_exists(*reference).await? {
                warn!(%reference, "unresolved reference");
                return Err(QualityMetricError::UnresolvedReference(*reference));
            }
        }
        Ok(())
    }
}
