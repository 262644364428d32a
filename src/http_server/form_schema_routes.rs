//! Form Schema HTTP Routes
//!
//! Public reads of schema versions; writes and activation are admin-only.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use super::errors::ApiResult;
use super::extract::RequireAdmin;
use super::state::{blocking, AppState};
use crate::form_schema::{FormSchemaPatch, FormSchemaVersion, NewFormSchema};

/// Create form schema routes
pub fn form_schema_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/form-schemas", get(list_handler).post(create_handler))
        .route("/form-schemas/active", get(active_handler))
        .route(
            "/form-schemas/:id",
            get(get_handler).put(update_handler).delete(remove_handler),
        )
        .route("/form-schemas/:id/activate", put(activate_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn list_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<FormSchemaVersion>>> {
    let store = state.form_schemas.clone();
    let versions = blocking(move || store.list()).await?;
    Ok(Json(versions))
}

async fn active_handler(State(state): State<Arc<AppState>>) -> ApiResult<Json<FormSchemaVersion>> {
    let store = state.form_schemas.clone();
    let version = blocking(move || store.get_active()).await?;
    Ok(Json(version))
}

async fn get_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<FormSchemaVersion>> {
    let store = state.form_schemas.clone();
    let version = blocking(move || store.get(id)).await?;
    Ok(Json(version))
}

async fn create_handler(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Json(request): Json<NewFormSchema>,
) -> ApiResult<(StatusCode, Json<FormSchemaVersion>)> {
    let store = state.form_schemas.clone();
    let version = blocking(move || store.create(request)).await?;
    Ok((StatusCode::CREATED, Json(version)))
}

async fn update_handler(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
    Json(patch): Json<FormSchemaPatch>,
) -> ApiResult<Json<FormSchemaVersion>> {
    let store = state.form_schemas.clone();
    let version = blocking(move || store.update(id, patch)).await?;
    Ok(Json(version))
}

async fn activate_handler(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> ApiResult<Json<FormSchemaVersion>> {
    let store = state.form_schemas.clone();
    let version = blocking(move || store.activate(id)).await?;
    Ok(Json(version))
}

async fn remove_handler(
    State(state): State<Arc<AppState>>,
    _admin: RequireAdmin,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let store = state.form_schemas.clone();
    blocking(move || store.remove(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
