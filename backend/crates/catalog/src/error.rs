//! Catalog Error Types
//!
//! Catalog error variants that integrate with the unified
//! `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::blob::BlobError;
use thiserror::Error;

/// Catalog-specific result type alias
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Catalog error variants
///
/// The `Display` text of client-facing variants is the exact `error` string
/// returned to the client.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid YouTuber ID")]
    InvalidYouTuberId,

    #[error("Invalid video ID")]
    InvalidVideoId,

    #[error("Name is required")]
    NameRequired,

    #[error("URL is required")]
    UrlRequired,

    #[error("Invalid URL format")]
    InvalidUrl,

    /// Unreadable JSON or multipart body; the detail is only logged
    #[error("Invalid request body")]
    InvalidBody(String),

    #[error("YouTuber not found")]
    YouTuberNotFound,

    #[error("Video not found")]
    VideoNotFound,

    #[error("Video with this URL already exists")]
    DuplicateVideoUrl,

    #[error("Another video with this URL already exists")]
    UrlTakenByAnotherVideo,

    #[error("Image file is required")]
    ImageRequired,

    #[error("Invalid file type. Only JPEG, PNG, WebP, and GIF are allowed.")]
    InvalidImageType,

    #[error("File too large. Maximum size is {max_mb}MB.")]
    ImageTooLarge { max_mb: usize },

    #[error("Invalid upload path")]
    InvalidImagePath,

    #[error("Image not found")]
    ImageNotFound,

    /// Page or image fetch failed
    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Blob store error: {0}")]
    Blob(#[from] BlobError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CatalogError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::InvalidYouTuberId
            | CatalogError::InvalidVideoId
            | CatalogError::NameRequired
            | CatalogError::UrlRequired
            | CatalogError::InvalidUrl
            | CatalogError::InvalidBody(_)
            | CatalogError::ImageRequired
            | CatalogError::InvalidImagePath => ErrorKind::BadRequest,
            CatalogError::YouTuberNotFound
            | CatalogError::VideoNotFound
            | CatalogError::ImageNotFound => ErrorKind::NotFound,
            CatalogError::DuplicateVideoUrl | CatalogError::UrlTakenByAnotherVideo => {
                ErrorKind::Conflict
            }
            CatalogError::InvalidImageType => ErrorKind::UnsupportedMediaType,
            CatalogError::ImageTooLarge { .. } => ErrorKind::PayloadTooLarge,
            CatalogError::Fetch(_)
            | CatalogError::Database(_)
            | CatalogError::Blob(_)
            | CatalogError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self.kind() {
            ErrorKind::InternalServerError => AppError::internal("Internal server error"),
            kind => AppError::new(kind, self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            CatalogError::Database(e) => {
                tracing::error!(error = %e, "Catalog database error");
            }
            CatalogError::Blob(e) => {
                tracing::error!(error = %e, "Catalog blob store error");
            }
            CatalogError::Fetch(msg) | CatalogError::Internal(msg) => {
                tracing::error!(message = %msg, "Catalog internal error");
            }
            CatalogError::InvalidBody(detail) => {
                tracing::debug!(detail = %detail, "Unreadable request body");
            }
            _ => {
                tracing::debug!(error = %self, "Catalog error");
            }
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        err.to_app_error()
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            CatalogError::InvalidVideoId.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            CatalogError::VideoNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            CatalogError::DuplicateVideoUrl.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            CatalogError::ImageTooLarge { max_mb: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            CatalogError::Internal("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = CatalogError::Internal("connection string leaked".into());
        assert_eq!(err.to_app_error().message(), "Internal server error");

        let err = CatalogError::ImageTooLarge { max_mb: 10 };
        assert_eq!(
            err.to_app_error().message(),
            "File too large. Maximum size is 10MB."
        );
    }
}
