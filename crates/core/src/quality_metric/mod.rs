//! Quality metric records.
//!
//! A quality metric references an award, a lab, the step run that produced
//! it and the files it describes, and may carry one attachment. Micro-RNA
//! metrics add per-replicate alignment and expression counts.

mod error;
mod service;
mod types;

pub use error::QualityMetricError;
pub use service::{ListResult, QualityMetricRepository, QualityMetricService};
pub use types::{
    EntityKind, EntityRef, MicroRnaMetrics, MirnaAlignment, MirnaExpression, QualityMetricRecord,
    StoredQualityMetric,
};
