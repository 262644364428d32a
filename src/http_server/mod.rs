//! # entrydesk HTTP Server Module
//!
//! Combines all endpoint routers into a single Axum server.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/form-schemas/*` - Form schema versions and activation
//! - `/settings/*` - Feature flags
//! - `/media/signed-url` - Presigned upload grants
//! - `/storage/object/*` - Signed object writes

pub mod config;
pub mod errors;
pub mod extract;
pub mod form_schema_routes;
pub mod media_routes;
pub mod object_routes;
pub mod observability_routes;
pub mod server;
pub mod settings_routes;
pub mod state;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use extract::{RequireAdmin, RequireAuth};
pub use server::HttpServer;
pub use state::AppState;
