//! Access Error Types
//!
//! This module provides access-control error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::kv::KvError;
use thiserror::Error;

/// Access-specific result type alias
pub type AccessResult<T> = Result<T, AccessError>;

/// Access-control error variants
///
/// The `Display` text of client-facing variants is the exact `error` string
/// returned to the client.
#[derive(Debug, Error)]
pub enum AccessError {
    /// Login body lacks password or CSRF token
    #[error("Password and CSRF token are required")]
    MissingCredentials,

    /// Mutating request without `X-CSRF-Token`
    #[error("CSRF token required")]
    CsrfTokenMissing,

    /// CSRF token failed verification
    #[error("Invalid CSRF token")]
    CsrfTokenInvalid,

    /// Wrong admin password
    #[error("Invalid password")]
    InvalidPassword,

    /// Missing or malformed `Authorization: Bearer` header
    #[error("Unauthorized")]
    Unauthorized,

    /// Bearer token failed verification
    #[error("Invalid or expired token")]
    TokenInvalid,

    /// Fingerprint is locked out
    #[error("Too many requests")]
    RateLimited { retry_after_secs: u64 },

    /// Rate-limit store failure
    #[error("Rate limit store error: {0}")]
    Store(#[from] KvError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AccessError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AccessError::MissingCredentials => StatusCode::BAD_REQUEST,
            AccessError::CsrfTokenMissing | AccessError::CsrfTokenInvalid => StatusCode::FORBIDDEN,
            AccessError::InvalidPassword | AccessError::Unauthorized | AccessError::TokenInvalid => {
                StatusCode::UNAUTHORIZED
            }
            AccessError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AccessError::Store(_) | AccessError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccessError::MissingCredentials => ErrorKind::BadRequest,
            AccessError::CsrfTokenMissing | AccessError::CsrfTokenInvalid => ErrorKind::Forbidden,
            AccessError::InvalidPassword | AccessError::Unauthorized | AccessError::TokenInvalid => {
                ErrorKind::Unauthorized
            }
            AccessError::RateLimited { .. } => ErrorKind::TooManyRequests,
            AccessError::Store(_) | AccessError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Server-side details stay in the logs.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AccessError::RateLimited { retry_after_secs } => {
                AppError::new(self.kind(), self.to_string()).with_retry_after(*retry_after_secs)
            }
            AccessError::Store(_) | AccessError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AccessError::Store(e) => {
                tracing::error!(error = %e, "Rate limit store error");
            }
            AccessError::Internal(msg) => {
                tracing::error!(message = %msg, "Access internal error");
            }
            AccessError::InvalidPassword => {
                tracing::warn!("Invalid login attempt");
            }
            AccessError::RateLimited { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Request blocked by rate limit");
            }
            AccessError::CsrfTokenInvalid | AccessError::TokenInvalid => {
                tracing::warn!(error = %self, "Token rejected");
            }
            _ => {
                tracing::debug!(error = %self, "Access error");
            }
        }
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<tokio::task::JoinError> for AccessError {
    fn from(err: tokio::task::JoinError) -> Self {
        AccessError::Internal(err.to_string())
    }
}
