//! API Error Handling
//!
//! Structured error responses with proper HTTP status codes and request
//! tracking, mapped from the core ledger taxonomy.

use crate::errors::LedgerError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Top-level API error response with request tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub request_id: String,
    pub error: ErrorBody,
}

/// Error body with structured information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error code (INSUFFICIENT_FUNDS, NOT_FOUND, INVALID_STATE, ...)
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details (can be any JSON)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// API error types with request tracking
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub request_id: String,
}

#[derive(Debug)]
pub enum ApiErrorKind {
    /// Paid play with a balance too low; no state changed.
    InsufficientFunds,
    NotFound(String),
    BadRequest(String),
    /// Operation does not fit the current state (finished board, spent
    /// daily spin, duplicate registration); no state changed.
    InvalidState(String),
    InternalError(String),
    ServiceUnavailable(String),
}

impl ApiError {
    pub fn not_found(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::NotFound(message),
            request_id,
        }
    }

    pub fn bad_request(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::BadRequest(message),
            request_id,
        }
    }

    pub fn internal_error(request_id: String, message: String) -> Self {
        Self {
            kind: ApiErrorKind::InternalError(message),
            request_id,
        }
    }

    /// Map a core ledger error onto the HTTP taxonomy.
    pub fn from_ledger(request_id: String, err: LedgerError) -> Self {
        let kind = match err {
            LedgerError::InsufficientFunds => ApiErrorKind::InsufficientFunds,
            LedgerError::UserNotFound { .. } => ApiErrorKind::NotFound(err.to_string()),
            LedgerError::BoardNotFound { .. } => ApiErrorKind::NotFound(err.to_string()),
            LedgerError::InvalidState(msg) => ApiErrorKind::InvalidState(msg),
            // Conflicts are retried inside the ledger and should never
            // reach a response; if one does, it is a server bug.
            LedgerError::ConcurrencyConflict => ApiErrorKind::InternalError(err.to_string()),
            LedgerError::StorageUnavailable(msg) => ApiErrorKind::ServiceUnavailable(msg),
        };
        Self { kind, request_id }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ApiErrorKind::InsufficientFunds => {
                write!(f, "[{}] Insufficient Funds", self.request_id)
            }
            ApiErrorKind::NotFound(msg) => write!(f, "[{}] Not Found: {}", self.request_id, msg),
            ApiErrorKind::BadRequest(msg) => {
                write!(f, "[{}] Bad Request: {}", self.request_id, msg)
            }
            ApiErrorKind::InvalidState(msg) => {
                write!(f, "[{}] Invalid State: {}", self.request_id, msg)
            }
            ApiErrorKind::InternalError(msg) => {
                write!(f, "[{}] Internal Error: {}", self.request_id, msg)
            }
            ApiErrorKind::ServiceUnavailable(msg) => {
                write!(f, "[{}] Service Unavailable: {}", self.request_id, msg)
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self.kind {
            ApiErrorKind::InsufficientFunds => (
                StatusCode::BAD_REQUEST,
                "INSUFFICIENT_FUNDS",
                "insufficient funds".to_string(),
            ),
            ApiErrorKind::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiErrorKind::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiErrorKind::InvalidState(msg) => (StatusCode::CONFLICT, "INVALID_STATE", msg.clone()),
            ApiErrorKind::InternalError(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
            ApiErrorKind::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                msg.clone(),
            ),
        };

        let body = Json(ErrorResponse {
            request_id: self.request_id.clone(),
            error: ErrorBody {
                code: code.to_string(),
                message,
                details: None,
            },
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_errors_map_to_expected_kinds() {
        let err = ApiError::from_ledger("req-1".to_string(), LedgerError::InsufficientFunds);
        assert!(matches!(err.kind, ApiErrorKind::InsufficientFunds));

        let err = ApiError::from_ledger(
            "req-2".to_string(),
            LedgerError::UserNotFound {
                user_id: "ghost".to_string(),
            },
        );
        assert!(matches!(err.kind, ApiErrorKind::NotFound(_)));

        let err = ApiError::from_ledger(
            "req-3".to_string(),
            LedgerError::InvalidState("spent".to_string()),
        );
        assert!(matches!(err.kind, ApiErrorKind::InvalidState(_)));

        let err = ApiError::from_ledger(
            "req-4".to_string(),
            LedgerError::StorageUnavailable("down".to_string()),
        );
        assert!(matches!(err.kind, ApiErrorKind::ServiceUnavailable(_)));
    }

    #[test]
    fn test_display_carries_request_id() {
        let err = ApiError::not_found("req-9".to_string(), "board gone".to_string());
        let rendered = err.to_string();
        assert!(rendered.contains("req-9"));
        assert!(rendered.contains("board gone"));
    }
}
