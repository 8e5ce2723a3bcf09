//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use replay_core::{ExecutionError, SessionError};

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "EXECUTOR_TIMEOUT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unknown or deleted session (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid request body (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Simulator exceeded its time budget (504).
    #[error("executor timeout: {0}")]
    ExecutorTimeout(String),

    /// Simulator output could not be decoded (502).
    #[error("malformed output: {0}")]
    MalformedOutput(String),

    /// Simulator could not run or exited with an error (500).
    #[error("executor failure: {0}")]
    ExecutorFailure(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::ExecutorTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, "EXECUTOR_TIMEOUT"),
            ApiError::MalformedOutput(_) => (StatusCode::BAD_GATEWAY, "MALFORMED_OUTPUT"),
            ApiError::ExecutorFailure(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "EXECUTOR_FAILURE")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::ExecutorTimeout(msg)
            | ApiError::MalformedOutput(msg)
            | ApiError::ExecutorFailure(msg) => msg,
        };

        let detail = ApiErrorDetail {
            code: code.to_string(),
            message,
        };

        let body = serde_json::json!({
            "success": false,
            "error": detail,
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::NotFound(_) => ApiError::NotFound(err.to_string()),
        }
    }
}

impl From<ExecutionError> for ApiError {
    fn from(err: ExecutionError) -> Self {
        match &err {
            ExecutionError::Timeout { .. } => ApiError::ExecutorTimeout(err.to_string()),
            ExecutionError::MalformedOutput(_) => ApiError::MalformedOutput(err.to_string()),
            ExecutionError::ExecutorFailure(_) => ApiError::ExecutorFailure(err.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
