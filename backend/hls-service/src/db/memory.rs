use async_trait::async_trait;
use bson::Document;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{DocumentStore, DocumentStoreError, Filter};

/// In-process document store for tests and local runs
#[derive(Default)]
pub struct InMemoryStore {
    collections: DashMap<String, Vec<Document>>,
    default_collection: String,
    closed: AtomicBool,
    close_calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new(default_collection: impl Into<String>) -> Self {
        Self {
            default_collection: default_collection.into(),
            ..Default::default()
        }
    }

    /// Number of documents in `collection`
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn close_count(&self) -> usize {
        self.close_calls.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert(&self, collection: &str, doc: Document) -> Result<(), DocumentStoreError> {
        if self.is_closed() {
            return Err(DocumentStoreError::Closed);
        }
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(doc);
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        if self.is_closed() {
            return Err(DocumentStoreError::Closed);
        }
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
            .unwrap_or_default())
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::AcqRel);
        if self.closed.swap(true, Ordering::AcqRel) {
            tracing::warn!("document store already closed");
        }
    }

    fn default_collection(&self) -> &str {
        &self.default_collection
    }
}
