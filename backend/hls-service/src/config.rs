/// Configuration management for hls-service
///
/// Loads configuration from environment variables. Object store credentials,
/// the MongoDB URI and the video output directory are required; everything
/// else has a default.
use s3_utils::S3Config;
use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;
use video_core::constants::{MAX_CONCURRENT_TRANSCODING, MAX_VIDEO_SIZE};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_MONGO_DATABASE: &str = "videohls";
pub const DEFAULT_MONGO_COLLECTION: &str = "file_uploads";
pub const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid value for {name}: {message}")]
    Invalid { name: &'static str, message: String },

    #[error("failed to read environment: {0}")]
    Environment(String),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppConfig,
    pub s3: S3Config,
    pub mongo: MongoConfig,
    pub video: VideoConfig,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
    /// Collection that receives generic upload records
    pub default_collection: String,
}

#[derive(Clone, Debug)]
pub struct VideoConfig {
    pub output_dir: PathBuf,
    pub ffmpeg_path: PathBuf,
    pub max_concurrent_transcodes: usize,
    pub max_upload_bytes: u64,
}

/// Raw environment, one field per variable
#[derive(Debug, Default, Deserialize)]
struct Env {
    aws_access_key: Option<String>,
    aws_secret_key: Option<String>,
    aws_bucket: Option<String>,
    aws_region: Option<String>,
    s3_endpoint: Option<String>,
    mongo_url: Option<String>,
    mongo_database: Option<String>,
    mongo_collection: Option<String>,
    video_output_dir: Option<String>,
    host: Option<String>,
    port: Option<String>,
    ffmpeg_path: Option<String>,
    max_concurrent_transcodes: Option<String>,
    max_upload_bytes: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of variables
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let env: Env =
            envy::from_iter(vars).map_err(|e| ConfigError::Environment(e.to_string()))?;

        let mut missing = Vec::new();
        let access_key_id = required(env.aws_access_key, "AWS_ACCESS_KEY", &mut missing);
        let secret_access_key = required(env.aws_secret_key, "AWS_SECRET_KEY", &mut missing);
        let bucket = required(env.aws_bucket, "AWS_BUCKET", &mut missing);
        let mongo_uri = required(env.mongo_url, "MONGO_URL", &mut missing);
        let output_dir = required(env.video_output_dir, "VIDEO_OUTPUT_DIR", &mut missing);
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let region = non_empty(env.aws_region);
        if region.is_none() {
            tracing::warn!(
                "AWS_REGION not set, defaulting to {}",
                s3_utils::config::DEFAULT_REGION
            );
        }

        let port = match non_empty(env.port) {
            Some(raw) => parse(&raw, "PORT")?,
            None => DEFAULT_PORT,
        };

        let max_concurrent_transcodes = match non_empty(env.max_concurrent_transcodes) {
            Some(raw) => parse(&raw, "MAX_CONCURRENT_TRANSCODES")?,
            None => MAX_CONCURRENT_TRANSCODING,
        };
        if max_concurrent_transcodes == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_CONCURRENT_TRANSCODES",
                message: "must be at least 1".to_string(),
            });
        }

        let max_upload_bytes = match non_empty(env.max_upload_bytes) {
            Some(raw) => parse(&raw, "MAX_UPLOAD_BYTES")?,
            None => MAX_VIDEO_SIZE,
        };

        Ok(Config {
            app: AppConfig {
                host: non_empty(env.host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port,
            },
            s3: S3Config {
                access_key_id: access_key_id.unwrap_or_default(),
                secret_access_key: secret_access_key.unwrap_or_default(),
                bucket: bucket.unwrap_or_default(),
                region: S3Config::region_or_default(region),
                endpoint: non_empty(env.s3_endpoint),
            },
            mongo: MongoConfig {
                uri: mongo_uri.unwrap_or_default(),
                database: non_empty(env.mongo_database)
                    .unwrap_or_else(|| DEFAULT_MONGO_DATABASE.to_string()),
                default_collection: non_empty(env.mongo_collection)
                    .unwrap_or_else(|| DEFAULT_MONGO_COLLECTION.to_string()),
            },
            video: VideoConfig {
                output_dir: PathBuf::from(output_dir.unwrap_or_default()),
                ffmpeg_path: PathBuf::from(
                    non_empty(env.ffmpeg_path).unwrap_or_else(|| DEFAULT_FFMPEG_PATH.to_string()),
                ),
                max_concurrent_transcodes,
                max_upload_bytes,
            },
        })
    }
}

/// Empty values count as unset
fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(
    value: Option<String>,
    name: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    let value = non_empty(value);
    if value.is_none() {
        missing.push(name);
    }
    value
}

fn parse<T>(raw: &str, name: &'static str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        message: e.to_string(),
    })
}
