//! Authentication extractors
//!
//! Both read only request parts, so placed before `Json` they reject a
//! caller before the body is parsed.

use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::errors::ApiError;
use super::state::AppState;
use crate::auth::{authenticate, authenticate_admin, Identity};

/// Any caller with a valid bearer token; 401 otherwise
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Identity);

/// A caller with the admin role; 401 without a valid token, 403 with another role
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Identity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequireAuth(authenticate(&parts.headers, &state.jwt)?))
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(RequireAdmin(authenticate_admin(&parts.headers, &state.jwt)?))
    }
}
