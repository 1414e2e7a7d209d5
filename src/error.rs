//! Service error types with HTTP status code mapping.
//!
//! [`SwapError`] is the central error type. Each variant maps to a specific
//! HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{EventId, SwapRequestId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2003,
///     "message": "invalid state: event ... is BUSY, expected SWAPPABLE"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Service error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category         | HTTP Status                          |
/// |-----------|------------------|--------------------------------------|
/// | 1000–1999 | Validation/Auth  | 400 Bad Request / 401 Unauthorized   |
/// | 2000–2999 | State/Not Found  | 404 Not Found / 409 Conflict         |
/// | 3000–3999 | Server           | 500 Internal Server Error            |
#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    /// Event is missing or not accessible to the caller.
    #[error("event not found: {0}")]
    EventNotFound(EventId),

    /// Swap request is missing, not addressed to the caller, or resolved.
    #[error("swap request not found: {0}")]
    SwapRequestNotFound(SwapRequestId),

    /// Entity is not in the status the transition requires.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Caller identity is missing or malformed.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A competing transaction modified the same rows; retries exhausted.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SwapError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::Unauthorized(_) => 1002,
            Self::EventNotFound(_) => 2001,
            Self::SwapRequestNotFound(_) => 2002,
            Self::InvalidState(_) => 2003,
            Self::Conflict(_) => 2004,
            Self::Internal(_) => 3000,
            Self::Persistence(_) => 3001,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::EventNotFound(_) | Self::SwapRequestNotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidState(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Persistence(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` if retrying the whole operation may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl From<sqlx::Error> for SwapError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            // serialization_failure, deadlock_detected, unique_violation
            if let Some("40001" | "40P01" | "23505") = db.code().as_deref() {
                return Self::Conflict(db.message().to_string());
            }
        }
        Self::Persistence(err.to_string())
    }
}

impl IntoResponse for SwapError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err = SwapError::EventNotFound(EventId::new());
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(!err.is_retryable());
    }

    #[test]
    fn invalid_state_maps_to_409() {
        let err = SwapError::InvalidState("busy".to_string());
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.error_code(), 2003);
    }

    #[test]
    fn only_conflict_is_retryable() {
        assert!(SwapError::Conflict("stale".to_string()).is_retryable());
        assert!(!SwapError::Persistence("down".to_string()).is_retryable());
    }

    #[test]
    fn row_not_found_is_persistence_error() {
        let err = SwapError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, SwapError::Persistence(_)));
    }

    #[test]
    fn into_response_sets_status() {
        let response = SwapError::Unauthorized("missing".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
