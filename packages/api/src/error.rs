//! # API Error Types
//!
//! `AppError` implements `axum::response::IntoResponse` and maps registry and
//! engine failures to HTTP status codes with a JSON body. Internal error
//! details are logged, never returned.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use certeasy_core::{EngineError, IssuerError};

/// JSON error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "NOT_FOUND")
    pub code: String,
    pub message: String,
}

/// Application-level error returned by every handler
#[derive(Error, Debug)]
pub enum AppError {
    /// No issuer with that name (404)
    #[error("not found: {0}")]
    NotFound(String),

    /// Request body failed validation (422)
    #[error("validation error: {0}")]
    Validation(String),

    /// Conflicts with current issuer state (409)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Engine did not answer in time (504)
    #[error("timeout: {0}")]
    Timeout(String),

    /// Anything else (500); the message is logged only
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn issuer_not_found(name: &str) -> Self {
        Self::NotFound(format!("issuer '{name}' does not exist"))
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => {
                tracing::error!(error = %self, "internal server error");
                "An internal error occurred".to_string()
            }
            Self::Timeout(_) => {
                tracing::warn!(error = %self, "certificate generation timed out");
                self.to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<IssuerError> for AppError {
    fn from(err: IssuerError) -> Self {
        match err {
            IssuerError::AlreadyExists(_) | IssuerError::IssuerDisabled(_) => {
                Self::Conflict(err.to_string())
            }
            IssuerError::Engine(EngineError::Timeout(_)) => Self::Timeout(err.to_string()),
            ref client if client.is_client_error() => Self::Validation(err.to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn not_found_status_code() {
        let (status, code) = AppError::issuer_not_found("root-ca").status_and_code();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "NOT_FOUND");
    }

    #[test]
    fn duplicate_issuer_is_conflict() {
        let err = AppError::from(IssuerError::AlreadyExists("root-ca".into()));
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);
    }

    #[test]
    fn disabled_issuer_is_conflict() {
        let err = AppError::from(IssuerError::IssuerDisabled("root-ca".into()));
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);
    }

    #[test]
    fn rejected_spec_is_validation_error() {
        let err = AppError::from(IssuerError::Engine(EngineError::InvalidSpec("bad".into())));
        assert_eq!(err.status_and_code().0, StatusCode::UNPROCESSABLE_ENTITY);
        let err = AppError::from(IssuerError::InvalidArgument("blank".into()));
        assert_eq!(err.status_and_code().0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn engine_timeout_is_gateway_timeout() {
        let err = AppError::from(IssuerError::Engine(EngineError::Timeout(Duration::from_secs(1))));
        assert_eq!(err.status_and_code().0, StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn storage_failures_are_internal() {
        let err = AppError::from(IssuerError::LockPoisoned);
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
        let err = AppError::from(IssuerError::TaskFailed("panicked".into()));
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
