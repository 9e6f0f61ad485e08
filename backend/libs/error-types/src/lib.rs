//! Shared error response body and error codes

use serde::{Deserialize, Serialize};

/// JSON body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP reason phrase, e.g. "Bad Request"
    pub error: String,

    /// Human readable description
    pub message: String,

    /// HTTP status code
    pub status: u16,

    /// Error category, one of [`error_types`]
    pub error_type: String,

    /// Stable machine code, one of [`error_codes`]
    pub code: String,

    /// Extra information, omitted when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    /// RFC 3339 timestamp
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str, status: u16, error_type: &str, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
            status,
            error_type: error_type.to_string(),
            code: code.to_string(),
            details: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }
}

/// Standard error codes
pub mod error_codes {
    // Requests
    pub const INVALID_REQUEST: &str = "INVALID_REQUEST";
    pub const FILE_FIELD_MISSING: &str = "FILE_FIELD_MISSING";
    pub const INVALID_PATH: &str = "INVALID_PATH";
    pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";
    pub const UPLOAD_TOO_LARGE: &str = "UPLOAD_TOO_LARGE";

    // Media
    pub const MEDIA_NOT_FOUND: &str = "MEDIA_NOT_FOUND";
    pub const MEDIA_PROCESSING_FAILED: &str = "MEDIA_PROCESSING_FAILED";

    // Dependencies
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const STORAGE_TIMEOUT: &str = "STORAGE_TIMEOUT";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const IO_ERROR: &str = "IO_ERROR";
    pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";
}

/// Standard error categories
pub mod error_types {
    pub const VALIDATION_ERROR: &str = "validation_error";
    pub const NOT_FOUND_ERROR: &str = "not_found_error";
    pub const METHOD_ERROR: &str = "method_error";
    pub const SERVER_ERROR: &str = "server_error";
    pub const TIMEOUT_ERROR: &str = "timeout_error";
}
