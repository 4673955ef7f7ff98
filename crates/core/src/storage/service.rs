//! Content-addressed blob store on top of Apache OpenDAL.

use std::future::Future;

use bytes::Bytes;
use opendal::{ErrorKind, Operator, services};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Reference to bytes held in a [`BlobStore`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobRef {
    /// Lower-case hex SHA-256 of the content.
    pub sha256: String,
    /// Storage key the content lives under.
    pub key: String,
    /// Content length in bytes.
    pub size: u64,
}

/// Byte storage addressed by content digest.
///
/// Storing the same bytes twice yields the same reference.
pub trait BlobStore: Send + Sync {
    /// Persists `bytes` and returns their reference. `suggested_name` is
    /// informational; it never affects the key.
    fn put(
        &self,
        bytes: Bytes,
        suggested_name: &str,
    ) -> impl Future<Output = Result<BlobRef, StorageError>> + Send;

    /// Reads back the bytes behind `blob`.
    fn get(&self, blob: &BlobRef) -> impl Future<Output = Result<Bytes, StorageError>> + Send;
}

/// Lower-case hex SHA-256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// [`BlobStore`] backed by an OpenDAL operator.
#[derive(Clone)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// In-memory store, used by tests and throwaway deployments.
    ///
    /// # Errors
    ///
    /// Returns an error if the memory service cannot be initialized.
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::from_config(StorageConfig::new(StorageProvider::Memory))
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let builder = services::S3::default()
                    .endpoint(endpoint)
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::AzureBlob {
                account,
                access_key,
                container,
            } => {
                let builder = services::Azblob::default()
                    .account_name(account)
                    .account_key(access_key)
                    .container(container);

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish()
                    .pipe(Ok)
            }
            StorageProvider::Memory => Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish()
                .pipe(Ok),
        }
    }

    /// Storage key for content with digest `sha256`.
    ///
    /// Format: `{prefix}/sha256/{first two hex chars}/{digest}`
    #[must_use]
    pub fn blob_key(&self, sha256: &str) -> String {
        let fanout = sha256.get(..2).unwrap_or(sha256);
        format!("{}/sha256/{fanout}/{sha256}", self.config.key_prefix)
    }

    /// Check if a key exists in storage.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than the key being absent.
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self.operator.stat(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

impl BlobStore for StorageService {
    async fn put(&self, bytes: Bytes, suggested_name: &str) -> Result<BlobRef, StorageError> {
        let sha256 = sha256_hex(&bytes);
        let key = self.blob_key(&sha256);
        let size = bytes.len() as u64;

        if self.exists(&key).await? {
            debug!(%key, size, suggested_name, "blob already present");
        } else {
            self.operator.write(&key, bytes).await?;
            debug!(
                %key,
                size,
                suggested_name,
                provider = self.provider_name(),
                "blob written"
            );
        }

        Ok(BlobRef { sha256, key, size })
    }

    async fn get(&self, blob: &BlobRef) -> Result<Bytes, StorageError> {
        let bytes = match self.operator.read(&blob.key).await {
            Ok(buffer) => buffer.to_bytes(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::not_found(&blob.key));
            }
            Err(e) => return Err(e.into()),
        };

        let actual = sha256_hex(&bytes);
        if actual != blob.sha256 {
            return Err(StorageError::Integrity {
                key: blob.key.clone(),
                expected: blob.sha256.clone(),
                actual,
            });
        }
        Ok(bytes)
    }
}

/// Extension trait for pipe operator.
trait Pipe: Sized {
    fn pipe<F, R>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }
}

impl<T> Pipe for T {}
