//! Maps service and storage failures onto HTTP status codes.
//!
//! Every error body is `{"error": "<message>"}`. Unexpected failures are
//! logged here and answered with a fixed message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pixelpost_service::ServiceError;
use pixelpost_storage::StorageError;

#[derive(Debug)]
pub enum ApiError {
    /// 400
    BadRequest(String),
    /// 404
    NotFound(String),
    /// 409: tracking token collision.
    Conflict(String),
    /// 503: store unreachable or refusing writes.
    Unavailable,
    /// 500: logged, not exposed.
    Internal(ServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Unavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "storage temporarily unavailable".to_owned())
            },
            Self::Internal(err) => {
                tracing::error!(error = %err, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            },
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(msg) => Self::BadRequest(msg),
            ServiceError::Storage(StorageError::NotFound) => {
                Self::NotFound("email message not found".to_owned())
            },
            ServiceError::Storage(ref e) if e.is_duplicate() => Self::Conflict(e.to_string()),
            ref e if e.is_transient() => {
                tracing::warn!(error = %e, "store unavailable");
                Self::Unavailable
            },
            other => Self::Internal(other),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        ServiceError::from(err).into()
    }
}
