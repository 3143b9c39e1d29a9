//! Error handling module for the Dragon Ball browser.
//!
//! [`FetchError`] is what the fetch client produces and what the session keeps
//! as visible error state. [`AppError`] maps everything onto HTTP status codes
//! and the response envelope of the local API.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::models::Resource;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UPSTREAM_ERROR: &str = "UPSTREAM_ERROR";
    pub const UPSTREAM_TIMEOUT: &str = "UPSTREAM_TIMEOUT";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
}

/// Failure of a single request against the remote API.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// Network failure or non-2xx status.
    #[error("API request failed: {message}")]
    Transport { message: String, status: Option<u16> },
    /// No response within the configured timeout.
    #[error("API request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    /// The body did not have the expected shape.
    #[error("unexpected API response: {0}")]
    Decode(String),
    /// A detail fetch found no entity with that id.
    #[error("{resource} {id} not found")]
    NotFound { resource: Resource, id: i64 },
    /// Rejected before anything was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Transport status code, where one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Transport { status, .. } => *status,
            FetchError::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Stable kind tag for the rendering layer.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Transport { .. } => "transport",
            FetchError::Timeout(_) => "timeout",
            FetchError::Decode(_) => "decode",
            FetchError::NotFound { .. } => "notFound",
            FetchError::InvalidRequest(_) => "invalidRequest",
        }
    }
}

/// Serializable snapshot of a [`FetchError`], kept as session state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorState {
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&FetchError> for ErrorState {
    fn from(err: &FetchError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            status: err.status(),
        }
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    /// Resource not found
    NotFound(String),
    /// Validation error
    Validation(String),
    /// The remote API failed or answered with an error status
    Upstream(String),
    /// The remote API did not answer in time
    Timeout(String),
    /// The remote API answered with an unexpected body
    Decode(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Decode(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::Upstream(_) => codes::UPSTREAM_ERROR,
            AppError::Timeout(_) => codes::UPSTREAM_TIMEOUT,
            AppError::Decode(_) => codes::DECODE_ERROR,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Upstream(msg) => msg.clone(),
            AppError::Timeout(msg) => msg.clone(),
            AppError::Decode(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        match &err {
            FetchError::NotFound { .. } => AppError::NotFound(err.to_string()),
            FetchError::Timeout(_) => AppError::Timeout(err.to_string()),
            FetchError::Decode(_) => AppError::Decode(err.to_string()),
            FetchError::InvalidRequest(_) => AppError::Validation(err.to_string()),
            FetchError::Transport { .. } => AppError::Upstream(err.to_string()),
        }
    }
}

/// Error details in the response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetails,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            success: false,
            error: ErrorDetails {
                code: error.error_code().to_string(),
                message: error.message(),
                details: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }
        (status, Json(ErrorResponse::new(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_mapping() {
        let not_found = FetchError::NotFound {
            resource: Resource::Planets,
            id: 99,
        };
        assert_eq!(not_found.to_string(), "planets 99 not found");
        assert_eq!(not_found.status(), Some(404));
        assert_eq!(
            AppError::from(not_found).status_code(),
            StatusCode::NOT_FOUND
        );

        let timeout = FetchError::Timeout(Duration::from_secs(15));
        assert_eq!(timeout.to_string(), "API request timed out after 15s");
        assert_eq!(
            AppError::from(timeout).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );

        let transport = FetchError::Transport {
            message: "status 500".to_string(),
            status: Some(500),
        };
        let state = ErrorState::from(&transport);
        assert_eq!(state.kind, "transport");
        assert_eq!(state.status, Some(500));
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            serde_json::json!({
                "kind": "transport",
                "message": "API request failed: status 500",
                "status": 500
            })
        );
        assert_eq!(AppError::from(transport).error_code(), codes::UPSTREAM_ERROR);
    }
}
