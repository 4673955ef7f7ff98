//! Deterministic payload builders for tests.
//!
//! Fixtures are generated rather than embedded as base64 literals, so every
//! test states what it is feeding the pipeline.

use std::io::Write;

use flate2::Compression;
use flate2::write::GzEncoder;

use crate::attachment::Attachment;
use crate::payload;

/// Fixed modification time so archives are byte-for-byte reproducible.
const FIXED_MTIME: u64 = 1_420_070_400;

/// Builds a ustar archive in memory.
#[derive(Debug, Default)]
pub struct TarballBuilder {
    entries: Vec<(String, Option<Vec<u8>>)>,
}

impl TarballBuilder {
    /// Starts an empty archive.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a directory entry.
    #[must_use]
    pub fn dir(mut self, path: &str) -> Self {
        self.entries.push((path.to_string(), None));
        self
    }

    /// Adds a regular file entry.
    #[must_use]
    pub fn file(mut self, path: &str, contents: &[u8]) -> Self {
        self.entries.push((path.to_string(), Some(contents.to_vec())));
        self
    }

    /// Serializes the archive, including the two trailing zero blocks.
    ///
    /// # Panics
    ///
    /// Panics if an entry path cannot be encoded in a ustar header.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for (path, contents) in self.entries {
            let mut header = tar::Header::new_ustar();
            header.set_mtime(FIXED_MTIME);
            header.set_uid(0);
            header.set_gid(0);
            match contents {
                None => {
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_mode(0o755);
                    header.set_size(0);
                    builder
                        .append_data(&mut header, &path, std::io::empty())
                        .expect("directory entry should append");
                }
                Some(data) => {
                    header.set_entry_type(tar::EntryType::Regular);
                    header.set_mode(0o644);
                    header.set_size(data.len() as u64);
                    builder
                        .append_data(&mut header, &path, data.as_slice())
                        .expect("file entry should append");
                }
            }
        }
        builder.into_inner().expect("in-memory tar should finish")
    }
}

/// Gzip-compresses `data`.
///
/// # Panics
///
/// Panics if compression into memory fails, which does not happen in practice.
#[must_use]
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("in-memory gzip write");
    encoder.finish().expect("in-memory gzip finish")
}

/// A small QC tarball: a `tmp/` directory and one metrics file.
#[must_use]
pub fn sample_tarball() -> Vec<u8> {
    TarballBuilder::new()
        .dir("tmp/")
        .file("tmp/qc_summary.txt", b"aligned_reads\t100\nexpressed_mirnas\t100\n")
        .build()
}

/// [`sample_tarball`] compressed with gzip.
#[must_use]
pub fn sample_tgz() -> Vec<u8> {
    gzip(&sample_tarball())
}

/// Builds an attachment whose `href` embeds `bytes` under `mime_type`.
#[must_use]
pub fn attachment(download: &str, mime_type: &str, bytes: &[u8]) -> Attachment {
    Attachment {
        download: download.to_string(),
        mime_type: mime_type.to_string(),
        href: payload::encode(mime_type, bytes),
    }
}

/// The attachment a generic quality metric typically carries.
#[must_use]
pub fn tgz_attachment() -> Attachment {
    attachment("test.tgz", "application/x-tar", &sample_tgz())
}
