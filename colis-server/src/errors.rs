use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

use colis_core::CoreError;

pub type AppResult<T> = Result<T, AppError>;

/// HTTP-facing error: a status code, the engine's stable kind string, and a
/// human-readable message. Raw datastore messages never reach clients.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub detail: Option<serde_json::Value>,
}

impl AppError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_request", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "kind": self.kind,
                "message": self.message,
                "status": self.status.as_u16(),
                "detail": self.detail,
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let kind = err.kind();
        let message = err.to_string();
        match err {
            CoreError::NotFound { .. } => Self::new(StatusCode::NOT_FOUND, kind, message),
            CoreError::InvalidTransition { .. } | CoreError::AlreadyAssigned(_) => {
                Self::new(StatusCode::CONFLICT, kind, message)
            }
            CoreError::CodeMismatch(_) => Self::new(StatusCode::FORBIDDEN, kind, message),
            CoreError::NoDemandsClaimed { rejected } => {
                let detail: Vec<_> = rejected
                    .iter()
                    .map(|(id, reason)| json!({ "demand_id": id, "reason": reason }))
                    .collect();
                Self::new(StatusCode::CONFLICT, kind, message).with_detail(json!(detail))
            }
            CoreError::InvalidRequest(_) => Self::new(StatusCode::BAD_REQUEST, kind, message),
            CoreError::ConstraintViolation(_)
            | CoreError::Model(_)
            | CoreError::Database(_) => {
                // Internal detail stays in the logs.
                tracing::error!(error = %message, kind, "engine failure");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    kind,
                    "internal storage error",
                )
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}
