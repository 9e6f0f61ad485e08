use async_trait::async_trait;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{DocumentStore, DocumentStoreError, Filter};

/// MongoDB-backed document store
pub struct MongoStore {
    client: Client,
    database: Database,
    default_collection: String,
    closed: AtomicBool,
}

impl MongoStore {
    /// Connect and ping, so an unreachable server fails at startup
    pub async fn connect(
        uri: &str,
        database: &str,
        default_collection: &str,
    ) -> Result<Self, DocumentStoreError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| DocumentStoreError::Connect(e.to_string()))?;
        options.app_name = Some("hls-service".to_string());

        let client =
            Client::with_options(options).map_err(|e| DocumentStoreError::Connect(e.to_string()))?;
        let database = client.database(database);

        database
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| DocumentStoreError::Connect(format!("ping failed: {e}")))?;

        tracing::info!(database = %database.name(), "Connected to MongoDB");

        Ok(Self {
            client,
            database,
            default_collection: default_collection.to_string(),
            closed: AtomicBool::new(false),
        })
    }

    fn ensure_open(&self) -> Result<(), DocumentStoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DocumentStoreError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, collection: &str, doc: Document) -> Result<(), DocumentStoreError> {
        self.ensure_open()?;
        self.database
            .collection::<Document>(collection)
            .insert_one(doc, None)
            .await
            .map_err(|e| DocumentStoreError::Operation {
                collection: collection.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        self.ensure_open()?;
        let op_err = |e: mongodb::error::Error| DocumentStoreError::Operation {
            collection: collection.to_string(),
            message: e.to_string(),
        };

        let cursor = self
            .database
            .collection::<Document>(collection)
            .find(filter.into_document(), None)
            .await
            .map_err(op_err)?;

        cursor.try_collect().await.map_err(op_err)
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            tracing::warn!("MongoDB client already closed");
            return;
        }
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB client closed");
    }

    fn default_collection(&self) -> &str {
        &self.default_collection
    }
}
