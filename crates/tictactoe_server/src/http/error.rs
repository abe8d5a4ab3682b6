//! Mapping engine failures onto HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::{Display, From};
use serde_json::json;
use tracing::{error, warn};

use crate::engine::EngineError;

/// Error returned by a route handler.
#[derive(Debug, Display, From)]
pub enum ApiError {
    /// Engine rejected or failed the request.
    #[display("{}", _0)]
    Engine(EngineError),

    /// Request body could not be understood.
    #[display("Bad request: {}", _0)]
    #[from(ignore)]
    BadRequest(String),

    /// The blocking task running the engine did not finish.
    #[display("Internal error: {}", _0)]
    #[from(ignore)]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            // Rejected moves are reported in the body of a successful response.
            ApiError::Engine(e) if e.is_user_error() => {
                warn!(error = %e, "Move rejected");
                StatusCode::OK
            }
            ApiError::Engine(e) => {
                error!(error = %e, "Store unavailable");
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::BadRequest(msg) => {
                warn!(error = %msg, "Bad request");
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(msg) => {
                error!(error = %msg, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
