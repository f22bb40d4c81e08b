//! API error types and handling

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    /// Command table could not be used
    #[error("Configuration error: {0}")]
    Config(#[from] binaryd_config::ConfigError),

    /// Command specification was rejected
    #[error("Command error: {0}")]
    Process(#[from] binaryd_process::ProcessError),

    /// Socket or file failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything else
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_type = match &self {
            ApiError::Config(_) => "config_error",
            ApiError::Process(_) => "command_error",
            ApiError::Io(_) => "io_error",
            ApiError::Internal(_) => "internal_error",
        };

        tracing::error!(error = %self, "Request failed");

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": self.to_string(),
            }
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
