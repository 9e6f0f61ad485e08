/// S3 configuration for the object store client
use serde::{Deserialize, Serialize};

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "eu-north-1";

#[derive(Clone, Serialize, Deserialize)]
pub struct S3Config {
    pub access_key_id: String,
    pub secret_access_key: String,
    /// S3 bucket name
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Optional endpoint for S3-compatible stores; enables path-style URLs
    pub endpoint: Option<String>,
}

impl S3Config {
    /// Region from an optional value, falling back to [`DEFAULT_REGION`]
    pub fn region_or_default(region: Option<String>) -> String {
        region
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }
}

// Credentials stay out of logs
impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
