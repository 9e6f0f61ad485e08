use super::{decode_all, DocumentStore, DocumentStoreError, Filter};
use crate::models::FileUploadRecord;

/// Store a generic upload record in the default collection
pub async fn insert_upload(
    store: &dyn DocumentStore,
    record: &FileUploadRecord,
) -> Result<(), DocumentStoreError> {
    let doc =
        bson::to_document(record).map_err(|e| DocumentStoreError::Serialization(e.to_string()))?;
    store.insert(store.default_collection(), doc).await
}

pub async fn list_uploads(
    store: &dyn DocumentStore,
    filter: Filter,
) -> Result<Vec<FileUploadRecord>, DocumentStoreError> {
    let collection = store.default_collection();
    let docs = store.find(collection, filter).await?;
    Ok(decode_all(collection, docs))
}
