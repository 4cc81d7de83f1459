use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::remote::RemoteError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    /// Raised locally before any network call. Never mutates state.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {message}")]
    Transport { status: Option<u16>, message: String },

    /// The remote call succeeded but the payload reports an error or is unusable.
    #[error("Partial data error: {0}")]
    PartialData(String),

    /// The action is not allowed in the current workflow state.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into())
    }

    /// Status code of the remote response, when the failure came from one.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            AppError::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<RemoteError> for AppError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Api { status, body } => AppError::Transport {
                status: Some(status),
                message: format!("HTTP {status} - {body}"),
            },
            RemoteError::Http(e) => AppError::Transport {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
            },
            RemoteError::Parse(e) => {
                AppError::PartialData(format!("Unreadable response body: {e}"))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Transport { message, .. } => {
                tracing::warn!("Transport error: {message}");
                (StatusCode::BAD_GATEWAY, "TRANSPORT_ERROR", message.clone())
            }
            AppError::PartialData(msg) => {
                tracing::warn!("Partial data error: {msg}");
                (StatusCode::BAD_GATEWAY, "PARTIAL_DATA_ERROR", msg.clone())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
