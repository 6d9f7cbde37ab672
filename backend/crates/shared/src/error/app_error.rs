//! Application Error - Unified error type for the application
//!
//! Defines [`AppError`] struct and [`AppResult<T>`] type alias.

use std::borrow::Cow;
use std::error::Error;
use std::fmt;

use super::kind::ErrorKind;

/// Unified application error
///
/// Every crate-level error enum converts into this type before it is
/// rendered. Only `message` reaches the client (as the `error` field);
/// `source` is for logs.
///
/// ## Examples
/// ```rust
/// use kernel::error::{app_error::AppError, kind::ErrorKind};
///
/// let err = AppError::new(ErrorKind::Forbidden, "Invalid CSRF token");
/// assert_eq!(err.status_code(), 403);
///
/// let err = AppError::new(ErrorKind::TooManyRequests, "Too many requests").with_retry_after(900);
/// assert_eq!(err.retry_after(), Some(900));
/// ```
pub struct AppError {
    kind: ErrorKind,
    message: Cow<'static, str>,
    /// What the client should do next
    action: Option<Cow<'static, str>>,
    /// Rendered as `retryAfter` and the `Retry-After` header
    retry_after_secs: Option<u64>,
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    #[inline]
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            action: None,
            retry_after_secs: None,
            source: None,
        }
    }

    #[inline]
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    #[inline]
    pub fn internal(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::InternalServerError, message)
    }

    #[inline]
    pub fn with_action(mut self, action: impl Into<Cow<'static, str>>) -> Self {
        self.action = Some(action.into());
        self
    }

    #[inline]
    pub fn with_retry_after(mut self, secs: u64) -> Self {
        self.retry_after_secs = Some(secs);
        self
    }

    /// Attach the underlying error; it is never rendered
    #[inline]
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn action(&self) -> Option<&str> {
        self.action.as_deref()
    }

    #[inline]
    pub fn retry_after(&self) -> Option<u64> {
        self.retry_after_secs
    }

    #[inline]
    pub fn is_server_error(&self) -> bool {
        self.kind.is_server_error()
    }
}

impl fmt::Debug for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = f.debug_struct("AppError");
        builder.field("kind", &self.kind);
        builder.field("message", &self.message);
        if let Some(action) = &self.action {
            builder.field("action", action);
        }
        if let Some(secs) = self.retry_after_secs {
            builder.field("retry_after_secs", &secs);
        }
        if let Some(source) = &self.source {
            builder.field("source", source);
        }
        builder.finish()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(action) = &self.action {
            write!(f, " (Action: {})", action)?;
        }
        Ok(())
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn Error + 'static))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_error() {
        let err = AppError::new(ErrorKind::Forbidden, "CSRF token required");
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "CSRF token required");
        assert!(err.action().is_none());
        assert!(err.retry_after().is_none());
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_shorthand_constructors() {
        assert_eq!(AppError::not_found("Video not found").status_code(), 404);
        assert!(AppError::internal("Internal server error").is_server_error());
    }

    #[test]
    fn test_with_retry_after() {
        let err = AppError::new(ErrorKind::TooManyRequests, "Too many requests").with_retry_after(900);
        assert_eq!(err.retry_after(), Some(900));
        assert!(format!("{:?}", err).contains("retry_after_secs"));
    }

    #[test]
    fn test_source_stays_out_of_display() {
        let io_err = std::io::Error::other("kv unreachable");
        let err = AppError::internal("Internal server error").with_source(io_err);
        assert!(err.source().is_some());
        assert!(!err.to_string().contains("kv unreachable"));
    }

    #[test]
    fn test_display() {
        let err = AppError::not_found("Video not found");
        assert_eq!(err.to_string(), "[Not Found] Video not found");

        let err_with_action = AppError::new(ErrorKind::Unauthorized, "Invalid or expired token")
            .with_action("Log in again");
        assert!(err_with_action.to_string().contains("Action: Log in again"));
    }
}
