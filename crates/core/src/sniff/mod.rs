//! Content type sniffing.
//!
//! Classifies a payload from its leading bytes alone. The declared MIME type
//! and filename never influence the result, so a sniff can be compared against
//! them afterwards.
//!
//! Recognised signatures:
//! - gzip: `1F 8B 08`, and the whole stream must inflate and match its trailer
//! - tar: a ustar header block whose checksum verifies
//! - tar+gzip: gzip whose first inflated block is a ustar header
//! - pdf, png, jpeg: leading magic

mod tar_header;

use std::io::{self, Read};

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

pub use tar_header::{BLOCK_SIZE, is_tar_header};

/// Content kind inferred from payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectedKind {
    /// Uncompressed POSIX or GNU tar archive.
    Tar,
    /// Gzip stream that does not wrap a tar archive.
    Gzip,
    /// Gzip stream wrapping a tar archive.
    TarGzip,
    /// PDF document.
    Pdf,
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
    /// No known signature matched.
    Unknown,
}

impl DetectedKind {
    /// Stable lower-case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tar => "tar",
            Self::Gzip => "gzip",
            Self::TarGzip => "tar_gzip",
            Self::Pdf => "pdf",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DetectedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of sniffing one payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SniffResult {
    /// What the bytes look like.
    pub detected_kind: DetectedKind,
    /// True when the signature was verified beyond its leading magic.
    pub confidence: bool,
}

impl SniffResult {
    const fn confident(kind: DetectedKind) -> Self {
        Self {
            detected_kind: kind,
            confidence: true,
        }
    }

    const fn tentative(kind: DetectedKind) -> Self {
        Self {
            detected_kind: kind,
            confidence: false,
        }
    }

    /// Result for bytes with no recognised signature.
    #[must_use]
    pub const fn unknown() -> Self {
        Self::tentative(DetectedKind::Unknown)
    }
}

const GZIP_MAGIC: [u8; 3] = [0x1F, 0x8B, 0x08];
const PDF_MAGIC: &[u8] = b"%PDF-";
const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Classifies `bytes` by signature.
#[must_use]
pub fn sniff(bytes: &[u8]) -> SniffResult {
    if bytes.starts_with(&GZIP_MAGIC) {
        return sniff_gzip(bytes);
    }

    if bytes.len() >= BLOCK_SIZE && is_tar_header(&bytes[..BLOCK_SIZE]) {
        return SniffResult::confident(DetectedKind::Tar);
    }

    if bytes.starts_with(PDF_MAGIC) {
        return SniffResult::tentative(DetectedKind::Pdf);
    }

    if bytes.starts_with(&PNG_MAGIC) {
        // IHDR is always the first chunk.
        let has_ihdr = bytes.get(12..16) == Some(b"IHDR".as_slice());
        return SniffResult {
            detected_kind: DetectedKind::Png,
            confidence: has_ihdr,
        };
    }

    if bytes.starts_with(&JPEG_MAGIC) {
        return SniffResult::tentative(DetectedKind::Jpeg);
    }

    SniffResult::unknown()
}

/// Inflates the whole stream and inspects its first tar block.
///
/// A stream that fails to inflate to the end (truncated, corrupt deflate
/// data, bad header flags, CRC or length trailer mismatch) is not treated as
/// gzip at all.
fn sniff_gzip(bytes: &[u8]) -> SniffResult {
    let mut decoder = GzDecoder::new(bytes);
    let mut window = Vec::with_capacity(BLOCK_SIZE);
    let head = decoder
        .by_ref()
        .take(BLOCK_SIZE as u64)
        .read_to_end(&mut window);
    let inflated = head.and_then(|_| io::copy(&mut decoder, &mut io::sink()));

    match inflated {
        Ok(_) if window.len() == BLOCK_SIZE && is_tar_header(&window) => {
            SniffResult::confident(DetectedKind::TarGzip)
        }
        Ok(_) => SniffResult::confident(DetectedKind::Gzip),
        Err(_) => SniffResult::unknown(),
    }
}

#[cfg(test)]
mod sniff_props;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{TarballBuilder, gzip, sample_tarball, sample_tgz};

    #[test]
    fn test_sniff_tar() {
        let result = sniff(&sample_tarball());
        assert_eq!(result.detected_kind, DetectedKind::Tar);
        assert!(result.confidence);
    }

    #[test]
    fn test_sniff_tar_gzip() {
        let result = sniff(&sample_tgz());
        assert_eq!(result.detected_kind, DetectedKind::TarGzip);
        assert!(result.confidence);
    }

    #[test]
    fn test_sniff_plain_gzip() {
        let result = sniff(&gzip(b"chr1\t100\t200\n"));
        assert_eq!(result.detected_kind, DetectedKind::Gzip);
        assert!(result.confidence);
    }

    #[test]
    fn test_sniff_gzip_of_empty_input() {
        assert_eq!(sniff(&gzip(b"")).detected_kind, DetectedKind::Gzip);
    }

    #[test]
    fn test_sniff_truncated_tgz_is_unknown() {
        let tgz = sample_tgz();
        assert_eq!(sniff(&tgz[..10]).detected_kind, DetectedKind::Unknown);
    }

    #[test]
    fn test_sniff_tgz_missing_trailer_is_unknown() {
        let tgz = sample_tgz();
        assert_eq!(sniff(&tgz[..tgz.len() - 8]), SniffResult::unknown());
        assert_eq!(sniff(&tgz[..tgz.len() - 1]), SniffResult::unknown());
    }

    #[test]
    fn test_sniff_tgz_with_bad_crc_is_unknown() {
        let mut tgz = sample_tgz();
        let crc_at = tgz.len() - 8;
        tgz[crc_at] ^= 0xFF;
        assert_eq!(sniff(&tgz), SniffResult::unknown());
    }

    #[test]
    fn test_sniff_large_tgz_cut_in_half_is_unknown() {
        let contents: Vec<u8> = (0..100_000u32).flat_map(u32::to_le_bytes).collect();
        let tgz = gzip(
            &TarballBuilder::new()
                .file("qc/alignments.tsv", &contents)
                .build(),
        );
        assert_eq!(sniff(&tgz).detected_kind, DetectedKind::TarGzip);
        assert_eq!(sniff(&tgz[..tgz.len() / 2]), SniffResult::unknown());
    }

    #[test]
    fn test_sniff_truncated_tar_is_unknown() {
        let tar = sample_tarball();
        assert_eq!(sniff(&tar[..10]), SniffResult::unknown());
    }

    #[test]
    fn test_sniff_tar_with_bad_checksum_is_unknown() {
        let mut tar = sample_tarball();
        tar[0] ^= 0xFF;
        assert_eq!(sniff(&tar).detected_kind, DetectedKind::Unknown);
    }

    #[test]
    fn test_sniff_gzip_with_garbage_body_is_unknown() {
        let mut bytes = GZIP_MAGIC.to_vec();
        bytes.extend_from_slice(&[0xFF; 64]);
        assert_eq!(sniff(&bytes).detected_kind, DetectedKind::Unknown);
    }

    #[test]
    fn test_sniff_documents_and_images() {
        assert_eq!(sniff(b"%PDF-1.7\n").detected_kind, DetectedKind::Pdf);
        assert_eq!(
            sniff(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]).detected_kind,
            DetectedKind::Jpeg
        );

        let mut png = PNG_MAGIC.to_vec();
        png.extend_from_slice(&[0, 0, 0, 13]);
        png.extend_from_slice(b"IHDR");
        let result = sniff(&png);
        assert_eq!(result.detected_kind, DetectedKind::Png);
        assert!(result.confidence);

        let result = sniff(&PNG_MAGIC);
        assert_eq!(result.detected_kind, DetectedKind::Png);
        assert!(!result.confidence);
    }

    #[test]
    fn test_sniff_text_and_empty_are_unknown() {
        assert_eq!(sniff(b"").detected_kind, DetectedKind::Unknown);
        assert_eq!(
            sniff(b"aligned_reads\t100\n").detected_kind,
            DetectedKind::Unknown
        );
    }

    #[test]
    fn test_detected_kind_serde_names() {
        let json = serde_json::to_string(&DetectedKind::TarGzip).expect("serialize");
        assert_eq!(json, "\"tar_gzip\"");
        assert_eq!(DetectedKind::TarGzip.to_string(), "tar_gzip");
    }
}
