//! # Request Identity
//!
//! Resolves the caller behind an `Authorization: Bearer <jwt>` header.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::errors::{AuthError, AuthResult};
use super::jwt::{JwtManager, Role};
use crate::observability::{log_event, Event};

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub role: Role,
}

impl Identity {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Fail with 403 unless the caller is an administrator
    pub fn require_admin(&self) -> AuthResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AuthError::Forbidden(Role::Admin.as_str()))
        }
    }
}

/// Validate the bearer token in `headers`
pub fn authenticate(headers: &HeaderMap, jwt: &JwtManager) -> AuthResult<Identity> {
    let result = bearer_token(headers)
        .and_then(|token| jwt.validate_token(token))
        .map(|claims| Identity::new(claims.sub, claims.role));

    if let Err(e) = &result {
        log_event(Event::AuthRejected, &[("reason", &e.to_string())]);
    }
    result
}

/// Validate the bearer token and require the admin role
pub fn authenticate_admin(headers: &HeaderMap, jwt: &JwtManager) -> AuthResult<Identity> {
    let identity = authenticate(headers, jwt)?;
    identity.require_admin()?;
    Ok(identity)
}

fn bearer_token(headers: &HeaderMap) -> AuthResult<&str> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::MalformedToken)?;

    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(AuthError::MalformedToken),
    }
}
