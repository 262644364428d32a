//! Object HTTP Routes
//!
//! Target of presigned write URLs. The query string carries the grant
//! terms and signature; no bearer token is involved.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::put,
    Json, Router,
};
use serde::Serialize;

use super::errors::ApiResult;
use super::state::{blocking, AppState};
use crate::file_storage::{StoredObject, WriteSignature, OBJECT_ROUTE_PREFIX};

#[derive(Debug, Serialize)]
pub struct StoredObjectResponse {
    pub key: String,
    pub size: u64,
    pub content_type: String,
    pub sha256: String,
}

impl From<StoredObject> for StoredObjectResponse {
    fn from(object: StoredObject) -> Self {
        Self {
            key: object.key,
            size: object.size,
            content_type: object.content_type,
            sha256: object.sha256,
        }
    }
}

/// Create object routes
pub fn object_routes(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes();
    Router::new()
        .route(&format!("/{}/*key", OBJECT_ROUTE_PREFIX), put(put_object_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

async fn put_object_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Query(signature): Query<WriteSignature>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<StoredObjectResponse>)> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let gateway = state.objects.clone();
    let stored = blocking(move || {
        gateway.put_signed(&key, &signature, content_type.as_deref(), &body)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(stored.into())))
}
