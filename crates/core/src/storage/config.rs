//! Storage configuration types.

use std::path::PathBuf;

use qcvault_shared::StorageSection;
use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Storage provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
    /// Process memory; contents vanish on restart
    Memory,
}

impl StorageProvider {
    /// Create S3-compatible provider (Cloudflare R2, Supabase, AWS S3).
    #[must_use]
    pub fn s3(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name for logs and records.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
            Self::Memory => "memory",
        }
    }
}

impl TryFrom<&StorageSection> for StorageProvider {
    type Error = StorageError;

    fn try_from(section: &StorageSection) -> Result<Self, Self::Error> {
        fn required(value: Option<&String>, field: &str) -> Result<String, StorageError> {
            value
                .cloned()
                .ok_or_else(|| StorageError::configuration(format!("storage.{field} is required")))
        }

        match section.backend.as_str() {
            "fs" | "local" => Ok(Self::local_fs(section.root.clone())),
            "memory" => Ok(Self::Memory),
            "s3" => Ok(Self::S3 {
                endpoint: required(section.endpoint.as_ref(), "endpoint")?,
                bucket: required(section.bucket.as_ref(), "bucket")?,
                access_key_id: required(section.access_key_id.as_ref(), "access_key_id")?,
                secret_access_key: required(
                    section.secret_access_key.as_ref(),
                    "secret_access_key",
                )?,
                region: section
                    .region
                    .clone()
                    .unwrap_or_else(|| "auto".to_string()),
            }),
            "azblob" | "azure_blob" => Ok(Self::AzureBlob {
                account: required(section.account.as_ref(), "account")?,
                access_key: required(section.access_key.as_ref(), "access_key")?,
                container: required(section.container.as_ref(), "container")?,
            }),
            other => Err(StorageError::configuration(format!(
                "unknown storage backend '{other}'"
            ))),
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Key prefix under which blobs are written.
    pub key_prefix: String,
}

impl StorageConfig {
    /// Default key prefix.
    pub const DEFAULT_KEY_PREFIX: &'static str = "blobs";

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            key_prefix: Self::DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    /// Set the key prefix.
    #[must_use]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }
}
