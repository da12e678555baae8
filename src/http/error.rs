//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::ledger::LedgerError;
use crate::store::StoreError;

/// Error response body, matching the `{success, message}` envelope every
/// endpoint uses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

impl ErrorBody {
    fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (validation error)
    BadRequest(String),
    /// Resource not found
    NotFound(String),
    /// Verification rejected
    Forbidden(String),
    /// Internal server error
    Internal(String),
    /// Store error, mapped by variant
    Store(StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ErrorBody::new(msg)),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::new(msg)),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorBody::new(msg)),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::new(msg)),
            AppError::Store(e) => {
                let status = match &e {
                    // Admission-control rejections: the message names which
                    // constraint was violated.
                    StoreError::Ledger(LedgerError::CapacityExhausted)
                    | StoreError::Ledger(LedgerError::RestrictedCapacityExhausted) => {
                        StatusCode::CONFLICT
                    }
                    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, ErrorBody::new(e.to_string()))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Store(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
