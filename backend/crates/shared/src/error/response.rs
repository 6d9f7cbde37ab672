//! HTTP rendering of [`AppError`]
//!
//! Body: `{"error": message}` plus `action` and `retryAfter` when set.
//! Errors carrying a retry hint also get a `Retry-After` header.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use super::app_error::AppError;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Only the short message is exposed; the source stays in the logs.
        let mut body = serde_json::json!({ "error": self.message() });
        if let Some(action) = self.action() {
            body["action"] = serde_json::Value::from(action);
        }
        if let Some(secs) = self.retry_after() {
            body["retryAfter"] = serde_json::Value::from(secs);
        }

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = self.retry_after()
            && let Ok(value) = HeaderValue::from_str(&secs.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}
