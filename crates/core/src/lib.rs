//! Attachment ingestion core for qcvault.
//!
//! This crate contains the ingestion pipeline with ZERO web dependencies.
//!
//! # Modules
//!
//! - `payload` - Data URI decoding and encoding
//! - `sniff` - Content type detection from leading bytes
//! - `attachment` - Policy validation and the ingestion pipeline
//! - `storage` - Content-addressed blob storage over OpenDAL
//! - `quality_metric` - Quality metric records and their service

pub mod attachment;
pub mod payload;
pub mod quality_metric;
pub mod sniff;
pub mod storage;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
