/// Generic upload handlers - S3 storage plus a metadata record
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use s3_utils::{ByteStream, ObjectStore};
use std::sync::Arc;
use std::time::Duration;
use video_core::constants::STORAGE_UPLOAD_TIMEOUT_SECS;

use super::multipart::{next_file_field, write_field};
use crate::db::{upload_repo, DocumentStore};
use crate::error::{AppError, Result};
use crate::models::{FileUploadRecord, FileUploadResponse, PresignQuery, PresignResponse};

pub const DEFAULT_PRESIGN_SECS: u64 = 900;
pub const MAX_PRESIGN_SECS: u64 = 7 * 24 * 60 * 60;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

pub struct UploadHandler {
    objects: Arc<dyn ObjectStore>,
    documents: Arc<dyn DocumentStore>,
    max_upload_bytes: u64,
    upload_timeout: Duration,
}

impl UploadHandler {
    pub fn new(
        objects: Arc<dyn ObjectStore>,
        documents: Arc<dyn DocumentStore>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            objects,
            documents,
            max_upload_bytes,
            upload_timeout: Duration::from_secs(STORAGE_UPLOAD_TIMEOUT_SECS),
        }
    }

    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout = timeout;
        self
    }

    /// Spool the `file` field to disk, push it to the object store, then
    /// record its metadata. No record is written unless the store accepted
    /// the object.
    pub async fn handle_upload(&self, mut payload: Multipart) -> Result<FileUploadResponse> {
        let mut file = next_file_field(&mut payload).await?;
        let key = file.filename.clone();
        let content_type = file
            .content_type
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

        let spool = tempfile::NamedTempFile::new()?;
        let mut writer = tokio::fs::File::from_std(spool.reopen()?);
        let size = write_field(&mut file.field, &mut writer, self.max_upload_bytes).await?;
        drop(writer);

        let body = ByteStream::from_path(spool.path())
            .await
            .map_err(|e| AppError::Internal(format!("failed to read spooled upload: {e}")))?;

        tokio::time::timeout(
            self.upload_timeout,
            self.objects.upload(&key, body, Some(content_type.as_str())),
        )
        .await
        .map_err(|_| {
            tracing::warn!(key = %key, "object store upload timed out");
            AppError::Timeout(format!(
                "upload of `{key}` did not finish within {}s",
                self.upload_timeout.as_secs()
            ))
        })??;

        tracing::info!(key = %key, size, "Stored object");

        let record = FileUploadRecord::new(&key, size, content_type);
        if let Err(e) = upload_repo::insert_upload(self.documents.as_ref(), &record).await {
            tracing::warn!(key = %key, error = %e, "object stored but metadata insert failed");
            return Err(e.into());
        }

        Ok(FileUploadResponse {
            message: "File uploaded successfully and metadata stored".to_string(),
            key,
            size,
        })
    }

    pub async fn presign(&self, query: PresignQuery) -> Result<PresignResponse> {
        let key = query
            .key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| AppError::BadRequest("query parameter `key` is required".to_string()))?;

        let expires_in = query.expires_in.unwrap_or(DEFAULT_PRESIGN_SECS);
        if expires_in == 0 || expires_in > MAX_PRESIGN_SECS {
            return Err(AppError::BadRequest(format!(
                "expires_in must be between 1 and {MAX_PRESIGN_SECS} seconds"
            )));
        }

        let url = self
            .objects
            .presign(&key, Duration::from_secs(expires_in))
            .await?;

        Ok(PresignResponse { url, expires_in })
    }
}

/// POST /upload
pub async fn upload_file(
    handler: web::Data<UploadHandler>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let response = handler.handle_upload(payload).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /files/presign
pub async fn presign_file(
    handler: web::Data<UploadHandler>,
    query: web::Query<PresignQuery>,
) -> Result<HttpResponse> {
    let response = handler.presign(query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}
