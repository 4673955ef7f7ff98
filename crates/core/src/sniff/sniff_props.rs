//! Property-based tests for signature sniffing.
//!
//! The sniffer must never report an archive kind for bytes whose signature
//! has been removed or damaged, and must be total over arbitrary input.

use proptest::prelude::*;

use super::{BLOCK_SIZE, DetectedKind, sniff};
use crate::test_support::{TarballBuilder, gzip};

/// Strategy for small file contents placed inside generated archives.
fn member_contents() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..4096)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Sniffing arbitrary bytes never panics.
    #[test]
    fn prop_sniff_is_total(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
        let _ = sniff(&bytes);
    }

    /// Any tarball sniffs as tar, and gzip-wrapped as tar_gzip.
    #[test]
    fn prop_generated_archives_are_recognised(contents in member_contents()) {
        let tar = TarballBuilder::new().file("qc/metrics.tsv", &contents).build();
        prop_assert_eq!(sniff(&tar).detected_kind, DetectedKind::Tar);
        prop_assert_eq!(sniff(&gzip(&tar)).detected_kind, DetectedKind::TarGzip);
    }

    /// Truncating a tar-gzip stream inside its gzip header leaves nothing recognisable.
    #[test]
    fn prop_truncated_tgz_is_unknown(contents in member_contents(), cut in 0usize..10) {
        let tgz = gzip(&TarballBuilder::new().file("qc/metrics.tsv", &contents).build());
        prop_assert_eq!(sniff(&tgz[..cut]).detected_kind, DetectedKind::Unknown);
    }

    /// Dropping any part of the gzip trailer leaves nothing recognisable.
    #[test]
    fn prop_tgz_without_full_trailer_is_unknown(
        contents in member_contents(),
        missing in 1usize..=8,
    ) {
        let tgz = gzip(&TarballBuilder::new().file("qc/metrics.tsv", &contents).build());
        prop_assert_eq!(sniff(&tgz[..tgz.len() - missing]).detected_kind, DetectedKind::Unknown);
    }

    /// Removing the gzip magic from a tar-gzip stream leaves nothing recognisable.
    #[test]
    fn prop_stripped_gzip_magic_is_unknown(contents in member_contents()) {
        let tgz = gzip(&TarballBuilder::new().file("qc/metrics.tsv", &contents).build());
        prop_assert_eq!(sniff(&tgz[2..]).detected_kind, DetectedKind::Unknown);
    }

    /// Corrupting any byte of the ustar magic defeats tar detection.
    #[test]
    fn prop_corrupted_ustar_magic_is_unknown(
        contents in member_contents(),
        offset in 257usize..262,
        flip in 1u8..=255,
    ) {
        let mut tar = TarballBuilder::new().file("qc/metrics.tsv", &contents).build();
        tar[offset] ^= flip;
        prop_assert_eq!(sniff(&tar).detected_kind, DetectedKind::Unknown);
    }

    /// Truncating a tar below one block defeats tar detection.
    #[test]
    fn prop_short_tar_is_unknown(contents in member_contents(), cut in 0usize..BLOCK_SIZE) {
        let tar = TarballBuilder::new().file("qc/metrics.tsv", &contents).build();
        prop_assert_eq!(sniff(&tar[..cut]).detected_kind, DetectedKind::Unknown);
    }
}
