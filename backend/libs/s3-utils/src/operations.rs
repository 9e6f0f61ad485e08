/// S3 upload and presign operations
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use std::time::Duration;

use crate::config::S3Config;
use crate::{ByteStream, ObjectStore, S3Client, StorageError};

#[async_trait]
impl ObjectStore for S3Client {
    async fn upload(
        &self,
        key: &str,
        body: ByteStream,
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        validate_key(key)?;

        let mut request = self
            .client()
            .put_object()
            .bucket(&self.config().bucket)
            .key(key)
            .body(body);
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request.send().await.map_err(|e| StorageError::Upload {
            key: key.to_string(),
            message: describe_sdk_error(self.config(), &DisplayErrorContext(&e).to_string()),
        })?;

        tracing::debug!(key, bucket = %self.config().bucket, "object uploaded");
        Ok(())
    }

    async fn presign(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        validate_presign(key, expires_in)?;

        let presigning_config =
            PresigningConfig::expires_in(expires_in).map_err(|e| StorageError::Presign {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        let request = self
            .client()
            .get_object()
            .bucket(&self.config().bucket)
            .key(key)
            .presigned(presigning_config)
            .await
            .map_err(|e| StorageError::Presign {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(request.uri().to_string())
    }
}

pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.trim().is_empty() {
        return Err(StorageError::InvalidKey("key must not be empty".to_string()));
    }
    Ok(())
}

pub(crate) fn validate_presign(key: &str, expires_in: Duration) -> Result<(), StorageError> {
    validate_key(key)?;
    if expires_in.is_zero() {
        return Err(StorageError::Presign {
            key: key.to_string(),
            message: "expiry must be greater than zero".to_string(),
        });
    }
    Ok(())
}

/// Turn common SDK failures into actionable messages
fn describe_sdk_error(config: &S3Config, error_msg: &str) -> String {
    if error_msg.contains("InvalidAccessKeyId") || error_msg.contains("SignatureDoesNotMatch") {
        format!("S3 auth failed: check AWS_ACCESS_KEY / AWS_SECRET_KEY ({error_msg})")
    } else if error_msg.contains("NoSuchBucket") {
        format!("S3 bucket not found: {}", config.bucket)
    } else if error_msg.contains("AccessDenied") || error_msg.contains("403") {
        format!("access denied to bucket {} ({error_msg})", config.bucket)
    } else {
        error_msg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> S3Config {
        S3Config {
            access_key_id: "a".to_string(),
            secret_access_key: "b".to_string(),
            bucket: "videos".to_string(),
            region: "eu-north-1".to_string(),
            endpoint: None,
        }
    }

    #[test]
    fn test_describe_missing_bucket() {
        let msg = describe_sdk_error(&config(), "service error: NoSuchBucket");
        assert_eq!(msg, "S3 bucket not found: videos");
    }

    #[test]
    fn test_describe_bad_credentials() {
        let msg = describe_sdk_error(&config(), "InvalidAccessKeyId: nope");
        assert!(msg.starts_with("S3 auth failed"));
    }

    #[test]
    fn test_describe_passthrough() {
        assert_eq!(describe_sdk_error(&config(), "dispatch failure"), "dispatch failure");
    }

    #[test]
    fn test_validate_presign() {
        assert!(matches!(
            validate_presign("", Duration::from_secs(1)),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            validate_presign("clip.mp4", Duration::ZERO),
            Err(StorageError::Presign { .. })
        ));
        assert!(validate_presign("clip.mp4", Duration::from_secs(1)).is_ok());
    }
}
