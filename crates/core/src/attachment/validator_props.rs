//! Property-based tests for attachment validation.

use proptest::prelude::*;

use super::error::AttachmentError;
use super::policy::StaticPolicy;
use super::validator::{AttachmentCandidate, validate};
use crate::sniff::sniff;
use crate::test_support::{TarballBuilder, gzip};

/// Archive bytes paired with a filename and type the quality metric policy accepts.
fn accepted_archive() -> impl Strategy<Value = (Vec<u8>, &'static str, &'static str)> {
    let contents = proptest::collection::vec(any::<u8>(), 0..2048);
    (contents, 0usize..5).prop_map(|(contents, variant)| {
        let tar = TarballBuilder::new().file("qc/metrics.tsv", &contents).build();
        match variant {
            0 => (gzip(&tar), "metrics.tgz", "application/x-tar"),
            1 => (gzip(&tar), "metrics.tar.gz", "application/gzip"),
            2 => (tar, "metrics.tgz", "application/x-tar"),
            3 => (tar, "metrics.tar", "application/x-tar"),
            _ => (gzip(&contents), "metrics.gz", "application/x-gzip"),
        }
    })
}

fn declared_type() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("application/x-tar"),
        Just("application/gzip"),
        Just("application/pdf"),
        Just("image/png"),
        Just("text/plain"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Valid archives with a matching declared type and allowed extension validate.
    #[test]
    fn prop_valid_archives_accepted((bytes, download, declared) in accepted_archive()) {
        let candidate = AttachmentCandidate {
            download,
            declared_type: declared,
            uri_type: declared,
            payload_len: bytes.len(),
            sniff: sniff(&bytes),
        };
        prop_assert!(validate(&candidate, &StaticPolicy::quality_metric()).is_ok());
    }

    /// An empty payload is rejected as empty whatever else is declared.
    #[test]
    fn prop_empty_payload_always_empty(
        declared in declared_type(),
        download in "[a-z]{1,8}\\.[a-z]{1,4}",
    ) {
        let candidate = AttachmentCandidate {
            download: &download,
            declared_type: declared,
            uri_type: declared,
            payload_len: 0,
            sniff: sniff(&[]),
        };
        let result = validate(&candidate, &StaticPolicy::quality_metric());
        prop_assert!(matches!(result, Err(AttachmentError::EmptyPayload)));
    }

    /// Stripping the leading signature bytes turns an accepted archive into a mismatch.
    #[test]
    fn prop_stripped_signature_is_type_mismatch(
        contents in proptest::collection::vec(any::<u8>(), 0..2048),
    ) {
        let tgz = gzip(&TarballBuilder::new().file("qc/metrics.tsv", &contents).build());
        let stripped = &tgz[2..];
        let candidate = AttachmentCandidate {
            download: "test.tgz",
            declared_type: "application/x-tar",
            uri_type: "application/x-tar",
            payload_len: stripped.len(),
            sniff: sniff(stripped),
        };
        let result = validate(&candidate, &StaticPolicy::quality_metric());
        prop_assert!(
            matches!(result, Err(AttachmentError::TypeMismatch { .. })),
            "expected type mismatch, got {:?}",
            result
        );
    }
}
