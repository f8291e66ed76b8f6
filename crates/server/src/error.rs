//! HTTP error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use llm_bridge::RelayError;
use serde_json::json;
use thiserror::Error;

/// Errors a request handler can return
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing field 'image_base64'")]
    MissingImage,

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::MissingImage => (StatusCode::BAD_REQUEST, json!({ "error": self.to_string() })),
            Self::Relay(err @ RelayError::Transport(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": err.to_string() }),
            ),
            Self::Relay(
                err @ RelayError::Upstream {
                    status: upstream_status,
                    body: upstream_body,
                },
            ) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": err.to_string(),
                    "status_code": upstream_status,
                    "details": upstream_body,
                }),
            ),
            Self::Relay(err @ RelayError::Malformed(details)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": err.to_string(),
                    "details": details,
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
