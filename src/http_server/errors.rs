//! HTTP error responses
//!
//! Every module error maps to a JSON `{error, code}` body carrying the
//! status from that error's `status_code()`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::auth::AuthError;
use crate::file_storage::ObjectStoreError;
use crate::form_schema::FormSchemaError;
use crate::media::MediaError;
use crate::observability::{log_event, Event};
use crate::settings::SettingsError;

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

/// Error returned by every handler
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log_event(
                Event::RequestFailed,
                &[
                    ("error", &self.message),
                    ("status", &self.status.as_u16().to_string()),
                ],
            );
        }

        let body = ErrorResponse {
            error: self.message,
            code: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

macro_rules! api_error_from {
    ($($error:ty),* $(,)?) => {
        $(
            impl From<$error> for ApiError {
                fn from(err: $error) -> Self {
                    Self::new(err.status_code(), err.to_string())
                }
            }
        )*
    };
}

api_error_from!(
    AuthError,
    FormSchemaError,
    SettingsError,
    MediaError,
    ObjectStoreError,
);

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;
