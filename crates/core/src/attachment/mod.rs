//! Attachment ingestion.
//!
//! A submitted attachment carries its payload inline as a base64 data URI.
//! Ingestion decodes the payload, sniffs what it actually is, checks the
//! result against the resource's policy and stores the bytes in the blob
//! store. Each failure is tagged with the [`PipelineStage`] it came from.

mod error;
mod policy;
mod service;
mod types;
mod validator;

#[cfg(test)]
mod validator_props;

pub use error::AttachmentError;
pub use policy::{AttachmentPolicy, AttachmentRule, PolicyTable, StaticPolicy};
pub use service::{AttachmentService, IngestLimits};
pub use types::{Attachment, PipelineStage, ResourceKind, StoredAttachment, ValidatedAttachment};
pub use validator::{AttachmentCandidate, normalize_mime, validate};
