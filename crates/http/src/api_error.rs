//! Typed API error for HTTP handlers.
//!
//! Converts domain errors into proper HTTP responses with the JSON
//! envelope the callback consumers expect. Handlers return
//! `Result<_, ApiError>` instead of losing error context with bare
//! `StatusCode`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use callreach_storage::StorageError;

/// API error with HTTP status code and human-readable message.
///
/// Converts to a JSON response `{"success": false, "message": "..."}`.
/// The `Internal` variant logs the real error server-side and returns a
/// static message to the client, so no error detail leaks.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request, invalid input from the caller.
    BadRequest(String),
    /// 404 Not Found, requested resource doesn't exist.
    NotFound(String),
    /// 502 Bad Gateway, the telephony provider rejected or timed out.
    UpstreamFailed(String),
    /// 500 Internal Server Error. Details logged, not exposed.
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::UpstreamFailed(msg) => (StatusCode::BAD_GATEWAY, msg),
            Self::Internal(err) => {
                tracing::error!(error = ?err, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_owned())
            }
        };
        let body = serde_json::json!({"success": false, "message": message});
        (status, Json(body)).into_response()
    }
}

impl From<callreach_service::ServiceError> for ApiError {
    fn from(err: callreach_service::ServiceError) -> Self {
        use callreach_service::ServiceError;
        match err {
            ServiceError::Storage(StorageError::NotFound { entity, id }) => {
                Self::NotFound(format!("{entity} '{id}' not found"))
            }
            ServiceError::InvalidInput(msg) => Self::BadRequest(msg),
            ServiceError::Telephony(e) => Self::UpstreamFailed(e.to_string()),
            _ => Self::Internal(err.into()),
        }
    }
}
