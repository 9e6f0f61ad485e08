//! In-memory object store used by tests and local runs without S3

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::time::Duration;

use crate::operations::{validate_key, validate_presign};
use crate::{ByteStream, ObjectStore, StorageError};

/// Object body and content type as received
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
}

#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    bucket: String,
    objects: DashMap<String, StoredObject>,
}

impl InMemoryObjectStore {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: DashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.get(key).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn upload(
        &self,
        key: &str,
        body: ByteStream,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        validate_key(key)?;
        let data = body
            .collect()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?
            .into_bytes();

        self.objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.map(str::to_string),
            },
        );
        Ok(())
    }

    async fn presign(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        validate_presign(key, expires_in)?;
        Ok(format!(
            "memory://{}/{}?expires_in={}",
            self.bucket,
            key,
            expires_in.as_secs()
        ))
    }
}
