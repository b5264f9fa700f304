// Error types for label-helper
// Author: kelexine (https://github.com/kelexine)

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Unsupported image format: {0}")]
    UnsupportedImageFormat(String),

    #[error("Interpreter request failed (status {status}): {body}")]
    InterpreterRequestFailed { status: u16, body: String },

    #[error("Interpreter unreachable: {0}")]
    InterpreterUnreachable(String),

    #[error("Interpreter returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("Speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config parsing error: {0}")]
    ConfigParsing(#[from] config::ConfigError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LabelError {
    /// Machine-readable error type used in the JSON envelope
    pub fn error_type(&self) -> &'static str {
        match self {
            LabelError::FileTooLarge { .. } => "file_too_large",
            LabelError::UnsupportedImageFormat(_) => "unsupported_image_format",
            LabelError::InterpreterRequestFailed { .. } => "interpreter_request_failed",
            LabelError::InterpreterUnreachable(_) => "interpreter_unreachable",
            LabelError::MalformedResponse(_) => "malformed_response",
            LabelError::SynthesisFailed(_) => "synthesis_failed",
            LabelError::InvalidRequest(_) => "invalid_request_error",
            LabelError::Config(_) | LabelError::ConfigParsing(_) => "configuration_error",
            _ => "internal_error",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            LabelError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            LabelError::UnsupportedImageFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            LabelError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            LabelError::InterpreterRequestFailed { .. }
            | LabelError::InterpreterUnreachable(_)
            | LabelError::MalformedResponse(_)
            | LabelError::SynthesisFailed(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Convert LabelError to HTTP responses for Axum
impl IntoResponse for LabelError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "type": "error",
            "error": {
                "type": self.error_type(),
                "message": self.to_string(),
            }
        });

        (status, axum::Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, LabelError>;
