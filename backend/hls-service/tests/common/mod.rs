#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use s3_utils::{ByteStream, InMemoryObjectStore, ObjectStore, StorageError};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

use hls_service::db::InMemoryStore;
use hls_service::handlers::{UploadHandler, VideoHandler};
use hls_service::services::{TranscodeError, Transcoder};

pub const BOUNDARY: &str = "----hls-test-boundary";
pub const PLAYLIST: &str = "#EXTM3U\n#EXT-X-VERSION:3\n#EXTINF:10.0,\nplaylist0.ts\n#EXT-X-ENDLIST\n";

pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, filename: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            content_type: Some("application/octet-stream"),
            data,
        }
    }

    pub fn text(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            filename: None,
            content_type: None,
            data,
        }
    }
}

/// Content-Type header value and body for a multipart/form-data request
pub fn multipart_body(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{filename}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Writes a playlist and one segment, like a successful ffmpeg run
#[derive(Default)]
pub struct FakeTranscoder {
    pub calls: AtomicUsize,
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, input: &Path, output_dir: &Path) -> Result<(), TranscodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(input.is_file(), "source should be on disk before transcoding");
        tokio::fs::create_dir_all(output_dir).await.unwrap();
        tokio::fs::write(output_dir.join("playlist.m3u8"), PLAYLIST)
            .await
            .unwrap();
        tokio::fs::write(output_dir.join("playlist0.ts"), b"segment-0")
            .await
            .unwrap();
        Ok(())
    }

    fn playlist_name(&self) -> &str {
        "playlist.m3u8"
    }
}

pub struct FailingTranscoder;

#[async_trait]
impl Transcoder for FailingTranscoder {
    async fn transcode(&self, _input: &Path, _output_dir: &Path) -> Result<(), TranscodeError> {
        Err(TranscodeError::Aborted)
    }

    fn playlist_name(&self) -> &str {
        "playlist.m3u8"
    }
}

/// Succeeds without producing any output
pub struct SilentTranscoder;

#[async_trait]
impl Transcoder for SilentTranscoder {
    async fn transcode(&self, _input: &Path, _output_dir: &Path) -> Result<(), TranscodeError> {
        Ok(())
    }

    fn playlist_name(&self) -> &str {
        "playlist.m3u8"
    }
}

pub struct FailingObjectStore;

#[async_trait]
impl ObjectStore for FailingObjectStore {
    async fn upload(
        &self,
        key: &str,
        _body: ByteStream,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        Err(StorageError::Upload {
            key: key.to_string(),
            message: "access denied".to_string(),
        })
    }

    async fn presign(&self, key: &str, _expires_in: Duration) -> Result<String, StorageError> {
        Err(StorageError::Presign {
            key: key.to_string(),
            message: "access denied".to_string(),
        })
    }
}

pub struct SlowObjectStore(pub Duration);

#[async_trait]
impl ObjectStore for SlowObjectStore {
    async fn upload(
        &self,
        _key: &str,
        _body: ByteStream,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }

    async fn presign(&self, key: &str, _expires_in: Duration) -> Result<String, StorageError> {
        Ok(format!("slow://{key}"))
    }
}

/// Handlers wired to in-memory stores and a temporary output directory
pub struct Harness {
    pub output: TempDir,
    pub objects: Arc<InMemoryObjectStore>,
    pub documents: Arc<InMemoryStore>,
    pub upload: web::Data<UploadHandler>,
    pub video: web::Data<VideoHandler>,
}

impl Harness {
    pub fn new() -> Self {
        Self::build(None, Arc::new(FakeTranscoder::default()), 1024 * 1024, None)
    }

    pub fn with_transcoder(transcoder: Arc<dyn Transcoder>) -> Self {
        Self::build(None, transcoder, 1024 * 1024, None)
    }

    pub fn with_object_store(objects: Arc<dyn ObjectStore>, timeout: Option<Duration>) -> Self {
        Self::build(
            Some(objects),
            Arc::new(FakeTranscoder::default()),
            1024 * 1024,
            timeout,
        )
    }

    pub fn with_upload_limit(limit: u64) -> Self {
        Self::build(None, Arc::new(FakeTranscoder::default()), limit, None)
    }

    fn build(
        objects: Option<Arc<dyn ObjectStore>>,
        transcoder: Arc<dyn Transcoder>,
        limit: u64,
        timeout: Option<Duration>,
    ) -> Self {
        let output = tempfile::tempdir().unwrap();
        let memory_objects = Arc::new(InMemoryObjectStore::new("test-bucket"));
        let documents = Arc::new(InMemoryStore::new("file_uploads"));

        let objects: Arc<dyn ObjectStore> = match objects {
            Some(objects) => objects,
            None => memory_objects.clone(),
        };
        let mut upload = UploadHandler::new(objects, documents.clone(), limit);
        if let Some(timeout) = timeout {
            upload = upload.with_upload_timeout(timeout);
        }

        let video = VideoHandler::new(transcoder, documents.clone(), output.path(), limit);

        Self {
            output,
            objects: memory_objects,
            documents,
            upload: web::Data::new(upload),
            video: web::Data::new(video),
        }
    }

    /// Sub-directories of the output root, one per accepted video
    pub fn upload_dirs(&self) -> Vec<std::path::PathBuf> {
        std::fs::read_dir(self.output.path())
            .unwrap()
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.is_dir())
            .collect()
    }
}

#[macro_export]
macro_rules! test_app {
    ($harness:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .configure(hls_service::handlers::configure_routes(
                    $harness.upload.clone(),
                    $harness.video.clone(),
                ))
                .default_service(actix_web::web::to(hls_service::handlers::not_found)),
        )
        .await
    };
}
