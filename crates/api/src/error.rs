//! Structured error type implementing `axum::response::IntoResponse`.
//!
//! Workbench errors map onto HTTP statuses with a JSON body of the form
//! `{"error": {"code", "message"}}`. Storage-layer text never reaches the
//! client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use shopfloor_core::CoreError;
use shopfloor_engine::{EngineError, ErrorKind};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `NOT_FOUND` or `READ_ONLY_COLUMN`.
    pub code: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Malformed identifier, path segment or request body (400).
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub(crate) fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Engine(err) => match err.kind() {
                ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                ErrorKind::InvalidAddress => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_ADDRESS"),
                ErrorKind::InvalidField => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_FIELD"),
                ErrorKind::ReadOnlyColumn => (StatusCode::UNPROCESSABLE_ENTITY, "READ_ONLY_COLUMN"),
                ErrorKind::DecodeFailure => (StatusCode::UNPROCESSABLE_ENTITY, "DECODE_FAILURE"),
                ErrorKind::InvalidInput => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
                ErrorKind::StorageFailure => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_FAILURE")
                }
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "request failed");
        } else {
            tracing::warn!(code, error = %message, "request rejected");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Identifier and view parse failures arrive as `InvalidData` and become 400s.
impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        Self::Engine(EngineError::from(err))
    }
}
