//! # Auth Errors
//!
//! Error types for bearer-token authentication.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and authorization errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // ==================
    // Authentication Errors
    // ==================
    /// No `Authorization: Bearer` header
    #[error("Unauthorized: missing bearer token")]
    MissingCredentials,

    /// JWT token is malformed
    #[error("Unauthorized: malformed token")]
    MalformedToken,

    /// JWT token has expired
    #[error("Unauthorized: token expired")]
    TokenExpired,

    /// JWT signature, issuer or audience did not match
    #[error("Unauthorized: invalid token signature")]
    InvalidSignature,

    // ==================
    // Authorization Errors
    // ==================
    /// Authenticated, but the role is not allowed here
    #[error("Forbidden: {0} role required")]
    Forbidden(&'static str),

    // ==================
    // Internal Errors
    // ==================
    /// Token generation failed
    #[error("Internal error: token generation failed")]
    TokenGenerationFailed,
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::MissingCredentials
            | AuthError::MalformedToken
            | AuthError::TokenExpired
            | AuthError::InvalidSignature => 401,
            AuthError::Forbidden(_) => 403,
            AuthError::TokenGenerationFailed => 500,
        }
    }
}
