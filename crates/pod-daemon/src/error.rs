// error.rs — HTTP mapping of lifecycle errors.
//
// Every error leaves the service as `{ "error": <kind>, "message": <text> }`
// with a status that keeps the four lifecycle failure classes apart:
// not found 404, validation 400, state 409, upstream 502.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pod_lifecycle::{ErrorKind, LifecycleError};
use serde_json::json;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: ErrorKind::Validation.as_str(),
            message: message.into(),
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::State => StatusCode::CONFLICT,
        ErrorKind::Upstream => StatusCode::BAD_GATEWAY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<LifecycleError> for ApiError {
    fn from(err: LifecycleError) -> Self {
        let kind = err.kind();
        match kind {
            ErrorKind::Upstream => tracing::warn!(error = %err, "upstream failure"),
            ErrorKind::Internal => tracing::error!(error = %err, "internal failure"),
            _ => tracing::debug!(error = %err, "request rejected"),
        }
        Self {
            status: status_for(kind),
            kind: kind.as_str(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.kind, "message": self.message }));
        (self.status, body).into_response()
    }
}
