//! Document store access
//!
//! `DocumentStore` is the seam between handlers and MongoDB. The typed
//! repositories convert records to BSON only at this boundary.

use async_trait::async_trait;
use bson::{Bson, Document};
use serde::de::DeserializeOwned;
use thiserror::Error;

pub mod memory;
pub mod mongo;
pub mod upload_repo;
pub mod video_repo;

pub use memory::InMemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum DocumentStoreError {
    #[error("failed to connect to document store: {0}")]
    Connect(String),

    #[error("operation on `{collection}` failed: {message}")]
    Operation { collection: String, message: String },

    #[error("failed to encode record: {0}")]
    Serialization(String),

    #[error("document store is closed")]
    Closed,
}

/// Match-all or equality filter over top-level fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Vec<(String, Bson)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by(key: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::all().and(key, value)
    }

    pub fn and(mut self, key: impl Into<String>, value: impl Into<Bson>) -> Self {
        self.fields.push((key.into(), value.into()));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.fields
            .iter()
            .all(|(key, value)| doc.get(key) == Some(value))
    }

    pub fn into_document(self) -> Document {
        self.fields.into_iter().collect()
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, doc: Document) -> Result<(), DocumentStoreError>;

    async fn find(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Vec<Document>, DocumentStoreError>;

    /// Release the underlying client. Later calls are no-ops.
    async fn close(&self);

    /// Collection for generic upload records
    fn default_collection(&self) -> &str;
}

/// Decode documents, skipping any that do not fit `T`
pub(crate) fn decode_all<T: DeserializeOwned>(collection: &str, docs: Vec<Document>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match bson::from_document::<T>(doc) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(collection, error = %e, "skipping malformed document");
                None
            }
        })
        .collect()
}
