//! # Object Store Errors

use thiserror::Error;

/// Result type for object store operations
pub type ObjectStoreResult<T> = Result<T, ObjectStoreError>;

/// Object store errors
#[derive(Debug, Clone, Error)]
pub enum ObjectStoreError {
    // Object errors
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Object already exists: {0}")]
    ObjectAlreadyExists(String),

    // Validation errors
    #[error("Object too large: {0} bytes (granted: {1})")]
    ObjectTooLarge(u64, u64),

    #[error("Content type mismatch: granted {granted}, sent {sent}")]
    ContentTypeMismatch { granted: String, sent: String },

    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    #[error("Checksum mismatch")]
    ChecksumMismatch,

    // Signed URL errors
    #[error("URL expired")]
    UrlExpired,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    // I/O errors
    #[error("I/O error: {0}")]
    IoError(String),
}

impl ObjectStoreError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ObjectStoreError::ObjectNotFound(_) => 404,
            ObjectStoreError::ObjectAlreadyExists(_) => 409,
            ObjectStoreError::ObjectTooLarge(_, _) => 413,
            ObjectStoreError::ContentTypeMismatch { .. } => 403,
            ObjectStoreError::InvalidKey(_) => 400,
            ObjectStoreError::ChecksumMismatch => 422,
            ObjectStoreError::UrlExpired => 403,
            ObjectStoreError::InvalidSignature => 403,
            ObjectStoreError::InvalidBaseUrl(_) => 500,
            ObjectStoreError::IoError(_) => 500,
        }
    }
}
