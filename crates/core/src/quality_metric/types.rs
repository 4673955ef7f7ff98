//! Quality metric record types.

use chrono::{DateTime, Utc};
use qcvault_shared::types::{
    AnalysisStepRunId, AwardId, FileId, LabId, QualityMetricId, ReplicateId,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::error::QualityMetricError;
use crate::attachment::{Attachment, ResourceKind, StoredAttachment};

/// Kinds of entity a quality metric may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Funding award.
    Award,
    /// Submitting lab.
    Lab,
    /// Pipeline step run that produced the metric.
    AnalysisStepRun,
    /// Data file the metric describes.
    File,
    /// Experiment replicate.
    Replicate,
}

impl EntityKind {
    /// Every entity kind.
    pub const ALL: [Self; 5] = [
        Self::Award,
        Self::Lab,
        Self::AnalysisStepRun,
        Self::File,
        Self::Replicate,
    ];

    /// Singular name, used as `@type`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Award => "award",
            Self::Lab => "lab",
            Self::AnalysisStepRun => "analysis_step_run",
            Self::File => "file",
            Self::Replicate => "replicate",
        }
    }

    /// Collection name, used as the route segment.
    #[must_use]
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Award => "awards",
            Self::Lab => "labs",
            Self::AnalysisStepRun => "analysis_step_runs",
            Self::File => "files",
            Self::Replicate => "replicates",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference from a record to another entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityRef {
    /// Kind of the referenced entity.
    pub kind: EntityKind,
    /// Referenced id.
    pub id: Uuid,
}

impl EntityRef {
    /// Create a reference.
    #[must_use]
    pub const fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

/// A quality metric as submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetricRecord {
    /// Funding award.
    pub award: AwardId,
    /// Submitting lab.
    pub lab: LabId,
    /// Step run that produced the metric.
    pub step_run: AnalysisStepRunId,
    /// Files the metric describes.
    #[serde(default)]
    pub quality_metric_of: Vec<FileId>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Inline attachment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
    /// Kind-specific metric fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl QualityMetricRecord {
    /// Keys assigned by the server, which a submitted record may not carry.
    pub const RESERVED_FIELDS: [&'static str; 5] =
        ["uuid", "@type", "date_created", "attachment", "blob"];

    /// First extra field that collides with a server-assigned key.
    #[must_use]
    pub fn reserved_field(&self) -> Option<&'static str> {
        Self::RESERVED_FIELDS
            .into_iter()
            .find(|key| self.fields.contains_key(*key))
    }

    /// The common references every record carries.
    #[must_use]
    pub fn references(&self) -> Vec<EntityRef> {
        let mut refs = vec![
            EntityRef::new(EntityKind::Award, self.award.into_inner()),
            EntityRef::new(EntityKind::Lab, self.lab.into_inner()),
            EntityRef::new(EntityKind::AnalysisStepRun, self.step_run.into_inner()),
        ];
        refs.extend(
            self.quality_metric_of
                .iter()
                .map(|file| EntityRef::new(EntityKind::File, file.into_inner())),
        );
        refs
    }
}

/// Aligned read count for one replicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MirnaAlignment {
    /// Replicate the count belongs to.
    pub replicate: ReplicateId,
    /// Reads aligned to known miRNAs.
    pub aligned_reads: u64,
}

/// Expressed miRNA count for one replicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MirnaExpression {
    /// Replicate the count belongs to.
    pub replicate: ReplicateId,
    /// Distinct miRNAs detected as expressed.
    pub expressed_mirnas: u64,
}

/// Micro-RNA specific fields of a quality metric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MicroRnaMetrics {
    /// Per-replicate alignment counts.
    #[serde(rename = "miRNA_alignments", default)]
    pub alignments: Vec<MirnaAlignment>,
    /// Per-replicate expression counts.
    #[serde(rename = "miRNA_expression", default)]
    pub expression: Vec<MirnaExpression>,
}

impl MicroRnaMetrics {
    /// Field names this type reads from a record.
    pub const FIELDS: [&'static str; 2] = ["miRNA_alignments", "miRNA_expression"];

    /// Extracts the micro-RNA fields from a record's extra fields.
    ///
    /// Absent arrays are empty; present ones must be well formed.
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, QualityMetricError> {
        let subset: Map<String, Value> = Self::FIELDS
            .iter()
            .filter_map(|name| fields.get(*name).map(|v| ((*name).to_string(), v.clone())))
            .collect();
        serde_json::from_value(Value::Object(subset))
            .map_err(|e| QualityMetricError::invalid_record(format!("micro-RNA fields: {e}")))
    }

    /// Replicates referenced by either array.
    #[must_use]
    pub fn references(&self) -> Vec<EntityRef> {
        self.alignments
            .iter()
            .map(|a| a.replicate)
            .chain(self.expression.iter().map(|e| e.replicate))
            .map(|replicate| EntityRef::new(EntityKind::Replicate, replicate.into_inner()))
            .collect()
    }
}

/// A quality metric as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQualityMetric {
    /// Record id.
    pub uuid: QualityMetricId,
    /// Collection the record was submitted to.
    #[serde(rename = "@type")]
    pub kind: ResourceKind,
    /// Funding award.
    pub award: AwardId,
    /// Submitting lab.
    pub lab: LabId,
    /// Step run that produced the metric.
    pub step_run: AnalysisStepRunId,
    /// Files the metric describes.
    pub quality_metric_of: Vec<FileId>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Stored attachment, if one was submitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<StoredAttachment>,
    /// When the record was accepted.
    pub date_created: DateTime<Utc>,
    /// Kind-specific metric fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}
