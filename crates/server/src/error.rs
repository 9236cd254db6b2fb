// Centralized error-to-response mapping. Every handler returns ApiError on
// failure; the typed resolver errors convert here and nowhere else.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use moniker_core::ResolveError;
use serde_json::{json, Value};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    pub fn new(status: StatusCode, error: &str, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({
                "error": error,
                "detail": detail.into(),
            }),
        }
    }

    /// Attach a contextual field to the response body.
    pub fn with_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        if let Some(map) = self.body.as_object_mut() {
            map.insert(key.to_string(), value.into());
        }
        self
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad request", detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not found", detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Parse(parse) => {
                Self::new(StatusCode::BAD_REQUEST, "invalid moniker", parse.to_string())
            }
            ResolveError::Resolution { reason } => {
                Self::new(StatusCode::BAD_REQUEST, "resolution error", reason)
            }
            ResolveError::NotFound { path } => {
                Self::new(StatusCode::NOT_FOUND, "not found", format!("no source binding found for path '{path}'"))
                    .with_field("path", path)
            }
            ResolveError::AccessDenied {
                message,
                estimated_rows,
            } => Self::new(StatusCode::FORBIDDEN, "access denied", message)
                .with_field("estimated_rows", estimated_rows),
            ResolveError::Internal { reason } => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error", reason)
            }
        }
    }
}
