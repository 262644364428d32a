//! Media HTTP Routes
//!
//! Issues presigned upload grants to authenticated callers.

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};

use super::errors::ApiResult;
use super::extract::RequireAuth;
use super::state::{blocking, AppState};
use crate::media::{MediaError, UploadGrant, UploadGrantRequest};
use crate::settings::APPLICATIONS_OPEN;

/// Create media routes
pub fn media_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/media/signed-url", post(signed_url_handler))
        .with_state(state)
}

/// Applicants may only upload while applications are open; admins always may.
async fn signed_url_handler(
    State(state): State<Arc<AppState>>,
    RequireAuth(identity): RequireAuth,
    Json(request): Json<UploadGrantRequest>,
) -> ApiResult<Json<UploadGrant>> {
    if !identity.is_admin() {
        let settings = state.settings.clone();
        let open = blocking(move || settings.is_enabled(APPLICATIONS_OPEN)).await?;
        if !open {
            return Err(MediaError::ApplicationsClosed.into());
        }
    }

    let grant = state.uploads.request_upload_grant(&identity, &request)?;
    Ok(Json(grant))
}
