//! Blob storage for attachment payloads using Apache OpenDAL.
//!
//! Payloads are content-addressed: the key is derived from the SHA-256 of the
//! bytes, so identical payloads share one object and reads can be verified.
//!
//! Supported backends:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem
//! - Memory (tests)
//!
//! ```text
//! blobs/sha256/ab/ab3f...e9   <- put(bytes) / get(&BlobRef)
//! ```

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{BlobRef, BlobStore, StorageService, sha256_hex};
