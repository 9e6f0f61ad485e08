//! HLS output settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    H264_LEVEL, H264_PROFILE, HLS_LIST_SIZE, HLS_PLAYLIST_NAME, HLS_SEGMENT_SECONDS,
    HLS_START_NUMBER, PLAYLIST_CONTENT_TYPE, SEGMENT_CONTENT_TYPE, SEGMENT_EXTENSION,
};

/// Single-rendition HLS output parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HlsSettings {
    pub segment_seconds: u32,
    pub list_size: u32,
    pub start_number: u32,
    pub profile: String,
    pub level: String,
    pub playlist_name: String,
}

impl Default for HlsSettings {
    fn default() -> Self {
        Self {
            segment_seconds: HLS_SEGMENT_SECONDS,
            list_size: HLS_LIST_SIZE,
            start_number: HLS_START_NUMBER,
            profile: H264_PROFILE.to_string(),
            level: H264_LEVEL.to_string(),
            playlist_name: HLS_PLAYLIST_NAME.to_string(),
        }
    }
}

impl HlsSettings {
    /// Location of the playlist inside `output_dir`
    pub fn playlist_path(&self, output_dir: &Path) -> PathBuf {
        output_dir.join(&self.playlist_name)
    }
}

/// Whether `path` looks like a media segment of an HLS output
pub fn is_segment(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(SEGMENT_EXTENSION))
        .unwrap_or(false)
}

/// Content type override for HLS artifacts, `None` for anything else
pub fn hls_content_type(path: &Path) -> Option<&'static str> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("m3u8") => Some(PLAYLIST_CONTENT_TYPE),
        Some(ext) if ext.eq_ignore_ascii_case(SEGMENT_EXTENSION) => Some(SEGMENT_CONTENT_TYPE),
        _ => None,
    }
}
