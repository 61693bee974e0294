//! API error types with HTTP status code mapping.
//!
//! [`ApiError`] is the unified error type for all API endpoints. It implements
//! `axum::response::IntoResponse` to produce structured JSON error responses
//! with appropriate HTTP status codes. Partial failures inside undo, redo,
//! restore and batch chains are not errors; they are rendered into normal
//! responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use scenelink_bridge::BridgeError;
use scenelink_core::CoreError;

/// Structured error detail in API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "BRIDGE_OFFLINE").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API errors with HTTP status code mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Entity not found (404). `details` carries e.g. the known checkpoints.
    #[error("not found: {message}")]
    NotFound {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// Invalid request (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource conflict (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// The host process is unreachable (503).
    #[error("bridge offline: {0}")]
    BridgeOffline(String),

    /// The host did not answer in time (504).
    #[error("host timeout: {0}")]
    HostTimeout(String),

    /// Internal server error (500).
    #[error("internal error: {0}")]
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            ApiError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", message, details)
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg, None),
            ApiError::BridgeOffline(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, "BRIDGE_OFFLINE", msg, None)
            }
            ApiError::HostTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, "HOST_TIMEOUT", msg, None),
            ApiError::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg, None)
            }
        };

        let body = serde_json::json!({
            "success": false,
            "error": ApiErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        });

        (status, axum::Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CheckpointNotFound { ref known, .. } => ApiError::NotFound {
                details: Some(serde_json::json!({ "availableCheckpoints": known })),
                message: err.to_string(),
            },
            CoreError::CheckpointExists { .. } => ApiError::Conflict(err.to_string()),
            CoreError::InvalidCheckpointName
            | CoreError::NoUndoData { .. }
            | CoreError::NotUndoable { .. }
            | CoreError::CustomUndoUnsupported { .. }
            | CoreError::UnsupportedTool { .. } => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<BridgeError> for ApiError {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::Offline { .. } => ApiError::BridgeOffline(err.to_string()),
            BridgeError::Timeout { .. } => ApiError::HostTimeout(err.to_string()),
            BridgeError::Transport(_) | BridgeError::Protocol(_) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}
