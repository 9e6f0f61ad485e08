/// Object storage utilities for the video-hls service
///
/// Provides the `ObjectStore` seam used by the upload handlers, the
/// AWS S3 implementation and an in-memory implementation for tests.
use async_trait::async_trait;
use aws_sdk_s3::Client;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub mod config;
pub mod memory;
pub mod operations;

pub use aws_sdk_s3::primitives::ByteStream;
pub use config::S3Config;
pub use memory::InMemoryObjectStore;

/// Errors surfaced by object store operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to initialize object store client: {0}")]
    Init(String),

    #[error("invalid object key: {0}")]
    InvalidKey(String),

    #[error("failed to upload `{key}`: {message}")]
    Upload { key: String, message: String },

    #[error("failed to presign `{key}`: {message}")]
    Presign { key: String, message: String },
}

/// Minimal object store contract: streaming put and presigned GET
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `body` under `key`. The body is streamed, never buffered whole.
    async fn upload(
        &self,
        key: &str,
        body: ByteStream,
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Time-limited download URL for `key`
    async fn presign(&self, key: &str, expires_in: Duration) -> Result<String, StorageError>;
}

/// Shared S3 client wrapper
#[derive(Clone)]
pub struct S3Client {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Client {
    /// Build a client using the static credentials in `config`
    pub async fn connect(config: S3Config) -> Result<Self, StorageError> {
        use aws_sdk_s3::config::{Credentials, Region};

        if config.bucket.trim().is_empty() {
            return Err(StorageError::Init("bucket name is empty".to_string()));
        }

        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None, // No session token
            None, // No expiration
            "video_hls_static",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials);

        // Custom endpoint for S3-compatible storage like MinIO
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        tracing::debug!(
            bucket = %config.bucket,
            region = %config.region,
            "S3 client initialized"
        );

        Ok(Self {
            client: Arc::new(Client::from_conf(s3_config)),
            config,
        })
    }

    /// Get reference to underlying AWS S3 client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get S3 configuration
    pub fn config(&self) -> &S3Config {
        &self.config
    }
}
