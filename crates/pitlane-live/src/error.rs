//! Error types for the Pitlane HTTP API.
//!
//! [`ApiError`] unifies the failure modes of the REST handlers and converts
//! into a JSON error response via its [`IntoResponse`] implementation.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pitlane_data::DataError;

/// Errors that can occur in the REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The requested driver or session does not exist.
    #[error("{0}")]
    NotFound(String),

    /// A required parameter is missing or malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<DataError> for ApiError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::DriverNotFound(_) | DataError::SessionNotFound(_) => {
                Self::NotFound(err.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
