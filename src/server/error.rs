//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::base::types::Err;

/// Errors surfaced to HTTP clients as `{ "error": ... }`.
#[derive(Debug)]
pub enum ServerError {
    BadRequest(String),
    NotFound(String),
    Internal(Err),
}

impl From<Err> for ServerError {
    fn from(err: Err) -> Self {
        Self::Internal(err)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServerError::Internal(err) => {
                error!("Unhandled error: {err:#}");
                (StatusCode::INTERNAL_SERVER_ERROR, "An error occurred during processing.".to_string())
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}
