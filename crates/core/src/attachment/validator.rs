//! Attachment policy enforcement.
//!
//! Checks run in a fixed order and the first failure wins:
//! 1. the payload is non-empty
//! 2. the filename holds no control characters
//! 3. the filename extension is allowed
//! 4. the declared type agrees with the data URI and with the extension
//! 5. the sniffed kind is accepted for that extension and type

use super::error::AttachmentError;
use super::policy::{AttachmentPolicy, AttachmentRule};
use crate::sniff::SniffResult;

/// Everything the validator looks at for one attachment.
#[derive(Debug, Clone, Copy)]
pub struct AttachmentCandidate<'a> {
    /// Submitted filename.
    pub download: &'a str,
    /// Declared MIME type, as submitted.
    pub declared_type: &'a str,
    /// MIME type carried by the data URI header.
    pub uri_type: &'a str,
    /// Decoded payload length.
    pub payload_len: usize,
    /// Sniff outcome for the payload.
    pub sniff: SniffResult,
}

/// Validates `candidate` against `policy`.
pub fn validate<P>(candidate: &AttachmentCandidate<'_>, policy: &P) -> Result<(), AttachmentError>
where
    P: AttachmentPolicy + ?Sized,
{
    if candidate.payload_len == 0 {
        return Err(AttachmentError::EmptyPayload);
    }

    if candidate.download.chars().any(char::is_control) {
        return Err(AttachmentError::invalid_filename(candidate.download));
    }

    let by_extension: Vec<&AttachmentRule> = policy
        .rules()
        .iter()
        .filter(|rule| rule.matches_filename(candidate.download))
        .collect();
    if by_extension.is_empty() {
        return Err(AttachmentError::unsupported_extension(candidate.download));
    }

    let declared = normalize_mime(candidate.declared_type);
    let uri_type = normalize_mime(candidate.uri_type);
    if declared != uri_type {
        return Err(AttachmentError::type_mismatch(
            declared,
            format!("data URI type '{uri_type}'"),
        ));
    }

    let by_type: Vec<&AttachmentRule> = by_extension
        .into_iter()
        .filter(|rule| rule.allows_mime(&declared))
        .collect();
    if by_type.is_empty() {
        return Err(AttachmentError::type_mismatch(
            declared,
            format!("filename '{}'", candidate.download),
        ));
    }

    let detected = candidate.sniff.detected_kind;
    if !by_type.iter().any(|rule| rule.allows_kind(detected)) {
        return Err(AttachmentError::type_mismatch(
            declared,
            format!("sniffed kind '{detected}'"),
        ));
    }

    Ok(())
}

/// Lower-cases a MIME type and drops any parameters.
#[must_use]
pub fn normalize_mime(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}
