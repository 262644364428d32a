//! # Form Schema Errors

use thiserror::Error;

use crate::db::DbError;

/// Result type for form schema operations
pub type FormSchemaResult<T> = Result<T, FormSchemaError>;

/// Form schema store errors
#[derive(Debug, Clone, Error)]
pub enum FormSchemaError {
    #[error("Form schema not found: {0}")]
    NotFound(i64),

    #[error("No active form schema")]
    NoActiveVersion,

    #[error("Invalid form schema: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] DbError),
}

impl FormSchemaError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            FormSchemaError::NotFound(_) => 404,
            FormSchemaError::NoActiveVersion => 404,
            FormSchemaError::Validation(_) => 400,
            FormSchemaError::Storage(e) => e.status_code(),
        }
    }
}

impl From<rusqlite::Error> for FormSchemaError {
    fn from(e: rusqlite::Error) -> Self {
        FormSchemaError::Storage(e.into())
    }
}
