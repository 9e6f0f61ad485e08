/// Service layer for hls-service
pub mod paths;
pub mod transcoder;

pub use transcoder::{FfmpegTranscoder, HlsOutput, TranscodeError, Transcoder};
