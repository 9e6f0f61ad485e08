//! HLS and upload constants

/// Maximum accepted upload size (500 MB)
pub const MAX_VIDEO_SIZE: u64 = 500 * 1024 * 1024;

/// Name of the playlist ffmpeg writes into each output directory
pub const HLS_PLAYLIST_NAME: &str = "playlist.m3u8";

/// Target segment duration in seconds
pub const HLS_SEGMENT_SECONDS: u32 = 10;

/// Playlist entry cap; 0 keeps every segment
pub const HLS_LIST_SIZE: u32 = 0;

/// First segment sequence number
pub const HLS_START_NUMBER: u32 = 0;

/// H.264 profile passed to the encoder
pub const H264_PROFILE: &str = "baseline";

/// H.264 level passed to the encoder
pub const H264_LEVEL: &str = "3.0";

/// Extension of MPEG-TS segments produced by the hls muxer
pub const SEGMENT_EXTENSION: &str = "ts";

/// Content type for HLS playlists
pub const PLAYLIST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";

/// Content type for MPEG-TS segments
pub const SEGMENT_CONTENT_TYPE: &str = "video/mp2t";

/// Maximum concurrent transcoding jobs
pub const MAX_CONCURRENT_TRANSCODING: usize = 5;

/// Budget for a single object-store upload
pub const STORAGE_UPLOAD_TIMEOUT_SECS: u64 = 30;
