//! # Settings Errors

use thiserror::Error;

use crate::db::DbError;

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Settings store errors
#[derive(Debug, Clone, Error)]
pub enum SettingsError {
    #[error("Setting not found: {0}")]
    NotFound(String),

    #[error("Invalid setting key: {0}")]
    InvalidKey(String),

    #[error("Setting value too long: {0} bytes (max: {1})")]
    ValueTooLong(usize, usize),

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),
}

impl SettingsError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            SettingsError::NotFound(_) => 404,
            SettingsError::InvalidKey(_) => 400,
            SettingsError::ValueTooLong(_, _) => 400,
            SettingsError::Storage(e) => e.status_code(),
        }
    }
}

impl From<rusqlite::Error> for SettingsError {
    fn from(e: rusqlite::Error) -> Self {
        SettingsError::Storage(e.into())
    }
}
