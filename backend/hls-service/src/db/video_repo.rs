use super::{decode_all, DocumentStore, DocumentStoreError, Filter};
use crate::models::VideoUploadRecord;

pub const VIDEO_COLLECTION: &str = "video_uploads";

pub async fn insert_video(
    store: &dyn DocumentStore,
    record: &VideoUploadRecord,
) -> Result<(), DocumentStoreError> {
    let doc =
        bson::to_document(record).map_err(|e| DocumentStoreError::Serialization(e.to_string()))?;
    store.insert(VIDEO_COLLECTION, doc).await
}

/// Every decodable video record, in store order
pub async fn list_videos(
    store: &dyn DocumentStore,
    filter: Filter,
) -> Result<Vec<VideoUploadRecord>, DocumentStoreError> {
    let docs = store.find(VIDEO_COLLECTION, filter).await?;
    Ok(decode_all(VIDEO_COLLECTION, docs))
}
