/// Error types for hls-service
///
/// Every failure is rendered as the shared `ErrorResponse` JSON body.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use error_types::{error_codes, error_types as kinds, ErrorResponse};
use s3_utils::StorageError;
use thiserror::Error;

use crate::db::DocumentStoreError;
use crate::services::transcoder::TranscodeError;

/// Result type for hls-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A required multipart field was absent
    #[error("Bad request: {0}")]
    MissingField(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    #[error("Upload exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] DocumentStoreError),

    #[error("Transcoding failed: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<actix_multipart::MultipartError> for AppError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        AppError::BadRequest(format!("malformed multipart body: {err}"))
    }
}

impl AppError {
    fn kind_and_code(&self) -> (&'static str, &'static str) {
        match self {
            AppError::BadRequest(_) => (kinds::VALIDATION_ERROR, error_codes::INVALID_REQUEST),
            AppError::MissingField(_) => {
                (kinds::VALIDATION_ERROR, error_codes::FILE_FIELD_MISSING)
            }
            AppError::InvalidPath(_) => (kinds::VALIDATION_ERROR, error_codes::INVALID_PATH),
            AppError::NotFound(_) => (kinds::NOT_FOUND_ERROR, error_codes::MEDIA_NOT_FOUND),
            AppError::MethodNotAllowed(_) => {
                (kinds::METHOD_ERROR, error_codes::METHOD_NOT_ALLOWED)
            }
            AppError::PayloadTooLarge { .. } => {
                (kinds::VALIDATION_ERROR, error_codes::UPLOAD_TOO_LARGE)
            }
            AppError::Storage(_) => (kinds::SERVER_ERROR, error_codes::STORAGE_ERROR),
            AppError::Database(_) => (kinds::SERVER_ERROR, error_codes::DATABASE_ERROR),
            AppError::Transcode(_) => (kinds::SERVER_ERROR, error_codes::MEDIA_PROCESSING_FAILED),
            AppError::Io(_) => (kinds::SERVER_ERROR, error_codes::IO_ERROR),
            AppError::Timeout(_) => (kinds::TIMEOUT_ERROR, error_codes::STORAGE_TIMEOUT),
            AppError::Internal(_) => (kinds::SERVER_ERROR, error_codes::INTERNAL_SERVER_ERROR),
        }
    }

    /// Machine-readable extra for clients, where one exists
    fn details(&self) -> Option<String> {
        match self {
            AppError::PayloadTooLarge { limit } => Some(format!("max_upload_bytes={limit}")),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::MissingField(_) | AppError::InvalidPath(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Storage(_)
            | AppError::Database(_)
            | AppError::Transcode(_)
            | AppError::Io(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let (error_type, code) = self.kind_and_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), code, "{}", message);
        }

        let mut response = ErrorResponse::new(
            status.canonical_reason().unwrap_or("Error"),
            &message,
            status.as_u16(),
            error_type,
            code,
        );
        if let Some(details) = self.details() {
            response = response.with_details(details);
        }

        HttpResponse::build(status).json(response)
    }
}
