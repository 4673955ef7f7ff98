//! Attachment types and data structures.

use serde::{Deserialize, Serialize};

use crate::sniff::{DetectedKind, SniffResult};
use crate::storage::BlobRef;

/// Resource collections that accept attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Free-form quality metric with an optional attachment.
    GenericQualityMetric,
    /// Micro-RNA alignment and expression metrics.
    MicroRnaQualityMetric,
}

impl ResourceKind {
    /// Every resource kind.
    pub const ALL: [Self; 2] = [Self::GenericQualityMetric, Self::MicroRnaQualityMetric];

    /// Collection name, also the `@type` of stored records.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenericQualityMetric => "generic_quality_metric",
            Self::MicroRnaQualityMetric => "micro_rna_quality_metric",
        }
    }

    /// Parse from a collection name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "generic_quality_metric" => Some(Self::GenericQualityMetric),
            "micro_rna_quality_metric" => Some(Self::MicroRnaQualityMetric),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attachment as submitted: metadata plus the payload as a data URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Filename offered for download.
    pub download: String,
    /// Declared MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// `data:<mime>;base64,<payload>`.
    pub href: String,
}

/// Pipeline stage an attachment failed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Turning the data URI into bytes.
    Decode,
    /// Checking metadata and sniffed kind against policy.
    Validate,
    /// Persisting bytes in the blob store.
    Store,
}

impl PipelineStage {
    /// Stable lower-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::Validate => "validate",
            Self::Store => "store",
        }
    }
}

/// Attachment that passed validation and is ready to store.
#[derive(Debug, Clone)]
pub struct ValidatedAttachment {
    /// Filename offered for download.
    pub download: String,
    /// Normalized declared MIME type.
    pub mime_type: String,
    /// Decoded payload.
    pub bytes: Vec<u8>,
    /// Sniff outcome the validation was based on.
    pub sniff: SniffResult,
}

/// Attachment as persisted on a record. The data URI is replaced by a
/// download path and a blob reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAttachment {
    /// Filename offered for download.
    pub download: String,
    /// Declared MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Download path relative to the owning record.
    pub href: String,
    /// Payload size in bytes.
    pub size: u64,
    /// Kind the payload sniffed as.
    pub detected_kind: DetectedKind,
    /// Content-addressed blob holding the payload.
    pub blob: BlobRef,
}

impl StoredAttachment {
    /// Relative download path for an attachment named `download`.
    #[must_use]
    pub fn download_href(download: &str) -> String {
        format!("@@download/attachment/{download}")
    }
}
