//! Error types for the financial AI gateway

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Request / Pipeline Errors
    // =============================

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Malformed request body: {0}")]
    Rejected(#[from] JsonRejection),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Upstream LLM returned {status}: {message}")]
    Upstream { status: u16, message: String },

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AdvisorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdvisorError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AdvisorError::Rejected(rejection) => rejection.status(),
            AdvisorError::LlmError(_)
            | AdvisorError::Upstream { .. }
            | AdvisorError::HttpError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Errors leave the API as `{"detail": "..."}`
impl IntoResponse for AdvisorError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = match &self {
            AdvisorError::InvalidRequest(m) => m.clone(),
            AdvisorError::Rejected(rejection) => rejection.body_text(),
            other => {
                error!(error = %other, "request failed");
                other.to_string()
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
