//! HTTP error handling.
//!
//! Every request failure is answered the same way: status 500 with a body of
//! `{"error": "<message>"}`.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::earthengine::EngineError;

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

/// Application error type for HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Body missing, not JSON, or lacking a required key
    #[error("{0}")]
    InvalidRequest(String),

    /// Requested season has no date in the request body
    #[error("No date supplied for season '{0}'")]
    UnknownSeason(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        tracing::error!("Request failed: {}", message);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError { error: message }),
        )
            .into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}
