//! Application error type mapping to HTTP status codes and the error body.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use peerline_types::error::ChatError;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat core errors.
    Chat(ChatError),
    /// Malformed request: bad JSON body, query string or path id.
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(ChatError::NotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND", "Session or message not found".to_string())
            }
            AppError::Chat(ChatError::SessionClosed) => {
                (StatusCode::CONFLICT, "SESSION_CLOSED", "Session is closed".to_string())
            }
            AppError::Chat(ChatError::AlreadyAssigned) => (
                StatusCode::CONFLICT,
                "ALREADY_ASSIGNED",
                "Session is already assigned to another advocate".to_string(),
            ),
            AppError::Chat(ChatError::EmptyContent) => (
                StatusCode::BAD_REQUEST,
                "EMPTY_CONTENT",
                "Message content must not be empty".to_string(),
            ),
            AppError::Chat(ChatError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone())
            }
            AppError::Chat(ChatError::Storage(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Internal storage error".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        // Storage details stay in the log, never in the body.
        if let AppError::Chat(ChatError::Storage(detail)) = &self {
            tracing::error!(code, %detail, "Request failed");
        } else if status.is_server_error() {
            tracing::error!(code, %message, "Request failed");
        }

        let body = json!({
            "error": {
                "code": code,
                "message": message,
            }
        });

        (status, axum::Json(body)).into_response()
    }
}
