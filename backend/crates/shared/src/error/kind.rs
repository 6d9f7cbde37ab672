//! Error Kind - Classification of errors
//!
//! Each kind maps to one HTTP status. Crate error enums pick a kind per
//! variant; the kind alone decides the response status.

use serde::Serialize;

/// Error classification
///
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// assert_eq!(ErrorKind::TooManyRequests.status_code(), 429);
/// assert_eq!(ErrorKind::UnsupportedMediaType.to_string(), "Unsupported Media Type");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Missing or malformed input
    BadRequest,
    /// Wrong password, missing or rejected bearer token
    Unauthorized,
    /// Missing or rejected CSRF token
    Forbidden,
    NotFound,
    /// Unique constraint, e.g. a video URL already catalogued
    Conflict,
    /// Upload over the size limit
    PayloadTooLarge,
    /// Upload of a type other than JPEG, PNG, WebP or GIF
    UnsupportedMediaType,
    /// Client is locked out
    TooManyRequests,
    /// Includes store failures; never rendered with details
    InternalServerError,
    ServiceUnavailable,
}

impl ErrorKind {
    const fn status_and_reason(&self) -> (u16, &'static str) {
        match self {
            ErrorKind::BadRequest => (400, "Bad Request"),
            ErrorKind::Unauthorized => (401, "Unauthorized"),
            ErrorKind::Forbidden => (403, "Forbidden"),
            ErrorKind::NotFound => (404, "Not Found"),
            ErrorKind::Conflict => (409, "Conflict"),
            ErrorKind::PayloadTooLarge => (413, "Payload Too Large"),
            ErrorKind::UnsupportedMediaType => (415, "Unsupported Media Type"),
            ErrorKind::TooManyRequests => (429, "Too Many Requests"),
            ErrorKind::InternalServerError => (500, "Internal Server Error"),
            ErrorKind::ServiceUnavailable => (503, "Service Unavailable"),
        }
    }

    #[inline]
    pub const fn status_code(&self) -> u16 {
        self.status_and_reason().0
    }

    /// Standard reason phrase of the status
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.status_and_reason().1
    }

    /// 5xx kinds; these are logged at error level
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_statuses() {
        assert_eq!(ErrorKind::BadRequest.status_code(), 400);
        assert_eq!(ErrorKind::Unauthorized.status_code(), 401);
        assert_eq!(ErrorKind::Forbidden.status_code(), 403);
        assert_eq!(ErrorKind::TooManyRequests.status_code(), 429);
    }

    #[test]
    fn test_upload_statuses() {
        assert_eq!(ErrorKind::PayloadTooLarge.status_code(), 413);
        assert_eq!(ErrorKind::UnsupportedMediaType.status_code(), 415);
    }

    #[test]
    fn test_only_5xx_are_server_errors() {
        assert!(!ErrorKind::TooManyRequests.is_server_error());
        assert!(!ErrorKind::Conflict.is_server_error());
        assert!(ErrorKind::InternalServerError.is_server_error());
        assert!(ErrorKind::ServiceUnavailable.is_server_error());
    }

    #[test]
    fn test_serializes_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::TooManyRequests).unwrap(),
            "\"TOO_MANY_REQUESTS\""
        );
    }
}
