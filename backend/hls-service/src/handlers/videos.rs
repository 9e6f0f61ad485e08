/// Video handlers - upload, HLS transcoding and playback
use actix_files::NamedFile;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;
use video_core::hls_content_type;

use super::multipart::{next_file_field, write_field, FileField};
use crate::db::{video_repo, DocumentStore, Filter};
use crate::error::{AppError, Result};
use crate::models::{LoadVideoQuery, VideoUploadRecord, VideoUploadResponse};
use crate::pages;
use crate::services::paths::{prefixed_file_name, resolve_under};
use crate::services::{HlsOutput, Transcoder};

pub struct VideoHandler {
    transcoder: Arc<dyn Transcoder>,
    documents: Arc<dyn DocumentStore>,
    output_dir: PathBuf,
    max_upload_bytes: u64,
}

impl VideoHandler {
    pub fn new(
        transcoder: Arc<dyn Transcoder>,
        documents: Arc<dyn DocumentStore>,
        output_dir: impl Into<PathBuf>,
        max_upload_bytes: u64,
    ) -> Self {
        Self {
            transcoder,
            documents,
            output_dir: output_dir.into(),
            max_upload_bytes,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Save the upload under its own directory and transcode it there.
    /// The directory is removed again if any later step fails.
    pub async fn handle_upload(&self, mut payload: Multipart) -> Result<VideoUploadResponse> {
        let file = next_file_field(&mut payload).await?;
        let source_name = prefixed_file_name("source_", &file.filename).ok_or_else(|| {
            AppError::BadRequest(format!("unusable filename `{}`", file.filename))
        })?;

        let video_id = Uuid::new_v4().to_string();
        let upload_dir = self.output_dir.join(&video_id);
        tokio::fs::create_dir_all(&upload_dir).await?;

        let result = self.process(file, &source_name, &video_id, &upload_dir).await;
        if let Err(err) = &result {
            tracing::warn!(video_id = %video_id, error = %err, "video upload failed, removing output");
            if let Err(e) = tokio::fs::remove_dir_all(&upload_dir).await {
                tracing::warn!(video_id = %video_id, "failed to remove {}: {e}", upload_dir.display());
            }
        }
        result
    }

    async fn process(
        &self,
        mut file: FileField,
        source_name: &str,
        video_id: &str,
        upload_dir: &Path,
    ) -> Result<VideoUploadResponse> {
        let source = upload_dir.join(source_name);
        let mut writer = tokio::fs::File::create(&source).await?;
        let size = write_field(&mut file.field, &mut writer, self.max_upload_bytes).await?;
        drop(writer);
        tracing::info!(video_id, size, filename = %file.filename, "Saved video upload");

        self.transcoder.transcode(&source, upload_dir).await?;

        let playlist_name = self.transcoder.playlist_name();
        let output = HlsOutput::locate(upload_dir, playlist_name).await?;
        tracing::info!(video_id, segments = output.segments.len(), "HLS output ready");

        // the record keeps the name the client sent
        let record = VideoUploadRecord::new(
            video_id,
            &file.filename,
            output.playlist.display().to_string(),
        );
        video_repo::insert_video(self.documents.as_ref(), &record).await?;

        Ok(VideoUploadResponse {
            message: "Video uploaded and processed successfully".to_string(),
            video_id: video_id.to_string(),
            playlist: record.playlist_url(playlist_name),
            segments: output.segments.len(),
        })
    }

    /// Open a file under the output directory with HLS content types applied
    pub async fn open_media(&self, raw: &str) -> Result<NamedFile> {
        let path = resolve_under(&self.output_dir, raw).await?;
        let mut file = NamedFile::open_async(&path).await?;

        if let Some(content_type) = hls_content_type(&path) {
            let mime = content_type
                .parse::<mime::Mime>()
                .map_err(|e| AppError::Internal(format!("bad content type {content_type}: {e}")))?;
            file = file.set_content_type(mime).disable_content_disposition();
        }
        Ok(file)
    }

    pub async fn list(&self) -> Result<Vec<VideoUploadRecord>> {
        Ok(video_repo::list_videos(self.documents.as_ref(), Filter::all()).await?)
    }

    pub fn playlist_name(&self) -> &str {
        self.transcoder.playlist_name()
    }
}

/// POST /upload-video
pub async fn upload_video(
    handler: web::Data<VideoHandler>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let response = handler.handle_upload(payload).await?;
    Ok(HttpResponse::Ok().json(response))
}

/// GET /hls/{path}
pub async fn serve_hls(
    req: HttpRequest,
    handler: web::Data<VideoHandler>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let file = handler.open_media(&path).await?;
    Ok(file.into_response(&req))
}

/// GET /load-video?file=
pub async fn load_video(
    req: HttpRequest,
    handler: web::Data<VideoHandler>,
    query: web::Query<LoadVideoQuery>,
) -> Result<HttpResponse> {
    let name = query
        .into_inner()
        .file
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("query parameter `file` is required".to_string()))?;

    let file = handler.open_media(&name).await?;
    Ok(file.into_response(&req))
}

/// GET /video-player
pub async fn video_player(handler: web::Data<VideoHandler>) -> Result<HttpResponse> {
    let videos = handler.list().await?;
    if videos.is_empty() {
        return Err(AppError::NotFound("No videos found".to_string()));
    }

    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(pages::video_player(&videos, handler.playlist_name())))
}

/// GET /video-list
pub async fn video_list(handler: web::Data<VideoHandler>) -> Result<HttpResponse> {
    let videos = handler.list().await?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(pages::video_links(&videos, handler.playlist_name())))
}
