//! HLS transcoding via an external ffmpeg process
//!
//! The process runs on the blocking thread pool. A semaphore caps how many
//! run at once; the permit moves into the blocking job so it is held until
//! ffmpeg exits even if the request future is dropped.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use video_core::{is_segment, HlsSettings};

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ffmpeg exited with {status}: {output}")]
    Failed { status: ExitStatus, output: String },

    #[error("transcoding job was aborted")]
    Aborted,

    #[error("no HLS output in {0}")]
    MissingOutput(PathBuf),
}

#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Produce an HLS playlist and segments for `input` inside `output_dir`
    async fn transcode(&self, input: &Path, output_dir: &Path) -> Result<(), TranscodeError>;

    /// File name of the playlist written into `output_dir`
    fn playlist_name(&self) -> &str;
}

pub struct FfmpegTranscoder {
    program: PathBuf,
    settings: HlsSettings,
    permits: Arc<Semaphore>,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<PathBuf>, max_concurrent: usize) -> Self {
        Self {
            program: program.into(),
            settings: HlsSettings::default(),
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }
}

/// Argument list for a single-rendition HLS run
pub fn ffmpeg_args(input: &Path, output_dir: &Path, settings: &HlsSettings) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.as_os_str().to_owned()];
    for (flag, value) in [
        ("-profile:v", settings.profile.clone()),
        ("-level", settings.level.clone()),
        ("-start_number", settings.start_number.to_string()),
        ("-hls_time", settings.segment_seconds.to_string()),
        ("-hls_list_size", settings.list_size.to_string()),
        ("-f", "hls".to_string()),
    ] {
        args.push(flag.into());
        args.push(value.into());
    }
    args.push(settings.playlist_path(output_dir).into_os_string());
    args
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(&self, input: &Path, output_dir: &Path) -> Result<(), TranscodeError> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| TranscodeError::OutputDir {
                path: output_dir.to_path_buf(),
                source,
            })?;

        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| TranscodeError::Aborted)?;

        let program = self.program.clone();
        let args = ffmpeg_args(input, output_dir, &self.settings);
        tracing::info!(input = %input.display(), output_dir = %output_dir.display(), "Starting ffmpeg");

        let output = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            Command::new(&program)
                .args(&args)
                .stdin(Stdio::null())
                .output()
                .map_err(|source| TranscodeError::Spawn {
                    program: program.display().to_string(),
                    source,
                })
        })
        .await
        .map_err(|e| {
            tracing::error!("ffmpeg task panicked: {e}");
            TranscodeError::Aborted
        })??;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(TranscodeError::Failed {
                status: output.status,
                output: combined,
            });
        }

        tracing::info!(output_dir = %output_dir.display(), "ffmpeg finished");
        Ok(())
    }

    fn playlist_name(&self) -> &str {
        &self.settings.playlist_name
    }
}

/// Playlist and segment files produced by a run
#[derive(Debug, Clone, PartialEq)]
pub struct HlsOutput {
    pub playlist: PathBuf,
    pub segments: Vec<PathBuf>,
}

impl HlsOutput {
    /// Segments are the `.ts` files whose name starts with the playlist stem
    pub async fn locate(dir: &Path, playlist_name: &str) -> Result<Self, TranscodeError> {
        let missing = || TranscodeError::MissingOutput(dir.to_path_buf());

        let playlist = dir.join(playlist_name);
        match tokio::fs::metadata(&playlist).await {
            Ok(meta) if meta.is_file() => {}
            _ => return Err(missing()),
        }

        let stem = Path::new(playlist_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(playlist_name);

        let mut entries = tokio::fs::read_dir(dir).await.map_err(|_| missing())?;
        let mut segments = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|_| missing())? {
            let path = entry.path();
            let named_like_playlist = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with(stem))
                .unwrap_or(false);
            if !named_like_playlist || !is_segment(&path) {
                continue;
            }
            if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false) {
                segments.push(path);
            }
        }

        if segments.is_empty() {
            return Err(missing());
        }
        segments.sort();

        Ok(Self { playlist, segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffmpeg_args() {
        let args = ffmpeg_args(
            Path::new("/in/source_clip.mp4"),
            Path::new("/out/abc"),
            &HlsSettings::default(),
        );
        let args: Vec<String> = args
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            args,
            vec![
                "-y",
                "-i",
                "/in/source_clip.mp4",
                "-profile:v",
                "baseline",
                "-level",
                "3.0",
                "-start_number",
                "0",
                "-hls_time",
                "10",
                "-hls_list_size",
                "0",
                "-f",
                "hls",
                "/out/abc/playlist.m3u8",
            ]
        );
    }

    #[tokio::test]
    async fn test_locate_finds_playlist_and_segments() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("playlist.m3u8"), "#EXTM3U\n").unwrap();
        std::fs::write(dir.path().join("playlist1.ts"), b"b").unwrap();
        std::fs::write(dir.path().join("playlist0.ts"), b"a").unwrap();
        std::fs::write(dir.path().join("source_other.ts"), b"c").unwrap();

        let output = HlsOutput::locate(dir.path(), "playlist.m3u8").await.unwrap();
        assert_eq!(output.playlist, dir.path().join("playlist.m3u8"));
        assert_eq!(
            output.segments,
            vec![
                dir.path().join("playlist0.ts"),
                dir.path().join("playlist1.ts")
            ]
        );
    }

    #[tokio::test]
    async fn test_locate_requires_segments() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("playlist.m3u8"), "#EXTM3U\n").unwrap();

        assert!(matches!(
            HlsOutput::locate(dir.path(), "playlist.m3u8").await,
            Err(TranscodeError::MissingOutput(_))
        ));
        assert!(matches!(
            HlsOutput::locate(&dir.path().join("absent"), "playlist.m3u8").await,
            Err(TranscodeError::MissingOutput(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_successful_process_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("abc");
        let transcoder = FfmpegTranscoder::new("true", 2);

        transcoder
            .transcode(&dir.path().join("in.mp4"), &out)
            .await
            .unwrap();
        assert!(out.is_dir());
        assert_eq!(transcoder.available_permits(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = FfmpegTranscoder::new("false", 1);

        let err = transcoder
            .transcode(&dir.path().join("in.mp4"), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::Failed { status, .. } if !status.success()));
        assert_eq!(transcoder.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let transcoder = FfmpegTranscoder::new("/nonexistent/ffmpeg-binary", 1);

        assert!(matches!(
            transcoder
                .transcode(&dir.path().join("in.mp4"), dir.path())
                .await,
            Err(TranscodeError::Spawn { .. })
        ));
    }
}
