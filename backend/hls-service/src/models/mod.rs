/// Records persisted in the document store and the JSON bodies exchanged
/// over HTTP
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Duration, DurationRound, Utc};
use serde::{Deserialize, Serialize};

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// BSON datetimes hold milliseconds
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(Duration::milliseconds(1)).unwrap_or(now)
}

/// Metadata for a generic upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileUploadRecord {
    pub filename: String,
    /// Bytes actually received
    pub size: i64,
    pub content_type: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub upload_time: DateTime<Utc>,
}

impl FileUploadRecord {
    pub fn new(filename: impl Into<String>, size: u64, content_type: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            size: i64::try_from(size).unwrap_or(i64::MAX),
            content_type: content_type.into(),
            upload_time: now_millis(),
        }
    }
}

/// Metadata for a transcoded video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUploadRecord {
    /// Names the per-upload directory under the output root
    pub video_id: String,
    pub filename: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub upload_time: DateTime<Utc>,
    /// On-disk path of the generated playlist
    pub output_path: String,
}

impl VideoUploadRecord {
    pub fn new(
        video_id: impl Into<String>,
        filename: impl Into<String>,
        output_path: impl Into<String>,
    ) -> Self {
        Self {
            video_id: video_id.into(),
            filename: filename.into(),
            upload_time: now_millis(),
            output_path: output_path.into(),
        }
    }

    /// `/hls/...` URL of the playlist
    pub fn playlist_url(&self, playlist_name: &str) -> String {
        format!("/hls/{}/{}", self.video_id, playlist_name)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FileUploadResponse {
    pub message: String,
    pub key: String,
    pub size: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideoUploadResponse {
    pub message: String,
    pub video_id: String,
    pub playlist: String,
    pub segments: usize,
}

#[derive(Debug, Deserialize)]
pub struct PresignQuery {
    pub key: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresignResponse {
    pub url: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub struct LoadVideoQuery {
    pub file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_record_uses_camel_case_and_bson_datetime() {
        let record = FileUploadRecord::new("report.pdf", 2048, "application/pdf");
        let doc = bson::to_document(&record).unwrap();

        assert_eq!(doc.get_str("filename").unwrap(), "report.pdf");
        assert_eq!(doc.get_i64("size").unwrap(), 2048);
        assert_eq!(doc.get_str("contentType").unwrap(), "application/pdf");
        assert!(doc.get_datetime("uploadTime").is_ok());

        let back: FileUploadRecord = bson::from_document(doc).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_video_record_fields() {
        let record = VideoUploadRecord::new("abc", "clip.mp4", "/data/abc/playlist.m3u8");
        let doc = bson::to_document(&record).unwrap();

        assert_eq!(doc.get_str("videoId").unwrap(), "abc");
        assert_eq!(doc.get_str("outputPath").unwrap(), "/data/abc/playlist.m3u8");
        assert_eq!(record.playlist_url("playlist.m3u8"), "/hls/abc/playlist.m3u8");
    }

    #[test]
    fn test_upload_time_truncated_to_millis() {
        let record = FileUploadRecord::new("a", 1, "text/plain");
        assert_eq!(record.upload_time.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
