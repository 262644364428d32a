//! # Media Errors
//!
//! Two families: errors of the server-side grant request, and failures of
//! the client-side direct upload.

use std::time::Duration;

use thiserror::Error;

use crate::file_storage::ObjectStoreError;
use crate::settings::SettingsError;

/// Result type for grant issuance
pub type MediaResult<T> = Result<T, MediaError>;

/// Upload grant errors
#[derive(Debug, Clone, Error)]
pub enum MediaError {
    #[error("Invalid upload request: {0}")]
    Validation(String),

    #[error("Applications are closed")]
    ApplicationsClosed,

    #[error("Signing error: {0}")]
    Signer(#[from] ObjectStoreError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Upload client error: {0}")]
    Client(String),
}

impl MediaError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            MediaError::Validation(_) => 400,
            MediaError::ApplicationsClosed => 403,
            MediaError::Signer(e) => e.status_code(),
            MediaError::Settings(e) => e.status_code(),
            MediaError::Client(_) => 500,
        }
    }
}

/// Why a direct upload did not succeed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    /// No response before the deadline
    #[error("Upload of {file} timed out after {}s", .after.as_secs())]
    Timeout { file: String, after: Duration },

    /// Connection, TLS or protocol failure before a status arrived
    #[error("Upload of {file} failed: {cause}")]
    Transport { file: String, cause: String },

    /// Storage answered outside 200..300
    #[error("Upload of {file} rejected with HTTP status {status}")]
    Status { file: String, status: u16 },
}

impl UploadError {
    pub fn file(&self) -> &str {
        match self {
            UploadError::Timeout { file, .. }
            | UploadError::Transport { file, .. }
            | UploadError::Status { file, .. } => file,
        }
    }

    /// Short machine-readable kind, used in logs and CLI output
    pub fn kind(&self) -> &'static str {
        match self {
            UploadError::Timeout { .. } => "timeout",
            UploadError::Transport { .. } => "transport",
            UploadError::Status { .. } => "status",
        }
    }
}
