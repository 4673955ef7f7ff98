//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageSection,
    /// Attachment ingestion limits.
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit() -> usize {
    64 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Blob storage section.
///
/// Only the fields relevant to the selected `backend` are read; the core crate
/// turns this into a typed provider.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    /// One of `fs`, `memory`, `s3`, `azblob`.
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Root directory for the `fs` backend.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// S3 bucket name.
    pub bucket: Option<String>,
    /// S3 endpoint URL.
    pub endpoint: Option<String>,
    /// S3 region.
    pub region: Option<String>,
    /// S3 access key ID.
    pub access_key_id: Option<String>,
    /// S3 secret access key.
    pub secret_access_key: Option<String>,
    /// Azure storage account name.
    pub account: Option<String>,
    /// Azure storage access key.
    pub access_key: Option<String>,
    /// Azure container name.
    pub container: Option<String>,
}

fn default_backend() -> String {
    "fs".to_string()
}

fn default_root() -> PathBuf {
    PathBuf::from("./blobs")
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            root: default_root(),
            bucket: None,
            endpoint: None,
            region: None,
            access_key_id: None,
            secret_access_key: None,
            account: None,
            access_key: None,
            container: None,
        }
    }
}

/// Attachment ingestion limits.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Largest decoded attachment accepted, in bytes.
    #[serde(default = "default_max_payload")]
    pub max_payload_bytes: u64,
    /// Upper bound on a single blob store call, in milliseconds.
    #[serde(default = "default_store_timeout")]
    pub store_timeout_ms: u64,
}

fn default_max_payload() -> u64 {
    25 * 1024 * 1024
}

fn default_store_timeout() -> u64 {
    10_000
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_payload_bytes: default_max_payload(),
            store_timeout_ms: default_store_timeout(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("QCVAULT")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        config.try_deserialize()
    }
}
