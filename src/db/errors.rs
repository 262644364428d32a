//! # Database Errors

use thiserror::Error;

/// Result type for database operations
pub type DbResult<T> = Result<T, DbError>;

/// Persistence-layer errors
#[derive(Debug, Clone, Error)]
pub enum DbError {
    #[error("Failed to open database {path}: {message}")]
    Open { path: String, message: String },

    #[error("Migration {version} ({name}) failed: {message}")]
    Migration {
        version: u32,
        name: &'static str,
        message: String,
    },

    #[error("Database busy: {0}")]
    Busy(String),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("SQL error: {0}")]
    Sql(String),

    #[error("Corrupt row: {0}")]
    Corrupt(String),
}

impl DbError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            DbError::Busy(_) => 503,
            DbError::Constraint(_) => 409,
            _ => 500,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        match e.sqlite_error_code() {
            Some(rusqlite::ErrorCode::DatabaseBusy) | Some(rusqlite::ErrorCode::DatabaseLocked) => {
                DbError::Busy(e.to_string())
            }
            Some(rusqlite::ErrorCode::ConstraintViolation) => DbError::Constraint(e.to_string()),
            _ => match e {
                rusqlite::Error::FromSqlConversionFailure(..) => DbError::Corrupt(e.to_string()),
                other => DbError::Sql(other.to_string()),
            },
        }
    }
}
