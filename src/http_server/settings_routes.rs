//! Settings HTTP Routes
//!
//! Feature flags are readable by anyone; only administrators write them.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use super::errors::ApiResult;
use super::extract::RequireAdmin;
use super::state::{blocking, AppState};
use crate::settings::SettingEntry;

#[derive(Debug, Deserialize)]
pub struct SetValueRequest {
    pub value: String,
}

/// Create settings routes
pub fn settings_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/settings", get(list_handler))
        .route("/settings/:key", get(get_handler).put(set_handler))
        .with_state(state)
}

async fn list_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<SettingEntry>>> {
    let store = state.settings.clone();
    let entries = blocking(move || store.list()).await?;
    Ok(Json(entries))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> ApiResult<Json<SettingEntry>> {
    let store = state.settings.clone();
    let entry = blocking(move || store.get(&key)).await?;
    Ok(Json(entry))
}

async fn set_handler(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Path(key): Path<String>,
    Json(request): Json<SetValueRequest>,
) -> ApiResult<Json<SettingEntry>> {
    let store = state.settings.clone();
    let entry = blocking(move || store.set(&key, &request.value)).await?;
    Ok(Json(entry))
}
