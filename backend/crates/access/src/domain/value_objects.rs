//! Domain Value Objects

use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, header};

use crate::error::AccessError;

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Blocked {
        /// Seconds until the lockout ends, rounded up
        retry_after_secs: u64,
        /// Unix ms when the lockout ends
        until_ms: i64,
    },
}

impl RateLimitDecision {
    pub fn blocked(until_ms: i64, now_ms: i64) -> Self {
        RateLimitDecision::Blocked {
            retry_after_secs: platform::rate_limit::retry_after_secs(until_ms, now_ms),
            until_ms,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitDecision::Allowed)
    }

    /// `Err(RateLimited)` when blocked
    pub fn into_result(self) -> Result<(), AccessError> {
        match self {
            RateLimitDecision::Allowed => Ok(()),
            RateLimitDecision::Blocked {
                retry_after_secs, ..
            } => Err(AccessError::RateLimited { retry_after_secs }),
        }
    }
}

/// Verified bearer token of the current request
///
/// Inserted into request extensions by the auth gate; never stored anywhere
/// else.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential(String);

impl BearerCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Parse `Authorization: Bearer <token>`
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?;
        if token.is_empty() {
            return None;
        }
        Some(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerCredential")
            .field(&"[REDACTED]")
            .finish()
    }
}

impl<S> FromRequestParts<S> for BearerCredential
where
    S: Send + Sync,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerCredential>()
            .cloned()
            .ok_or(AccessError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_blocked_rounds_up() {
        let decision = RateLimitDecision::blocked(900_500, 0);
        assert_eq!(
            decision,
            RateLimitDecision::Blocked {
                retry_after_secs: 901,
                until_ms: 900_500
            }
        );
        assert!(!decision.is_allowed());
        assert!(matches!(
            decision.into_result(),
            Err(AccessError::RateLimited {
                retry_after_secs: 901
            })
        ));
    }

    #[test]
    fn test_bearer_from_headers() {
        let mut headers = HeaderMap::new();
        assert!(BearerCredential::from_headers(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(BearerCredential::from_headers(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(BearerCredential::from_headers(&headers).is_none());

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer n:1:h"),
        );
        assert_eq!(
            BearerCredential::from_headers(&headers).unwrap().as_str(),
            "n:1:h"
        );
    }

    #[test]
    fn test_bearer_debug_redacted() {
        let credential = BearerCredential::new("secret-token");
        assert!(!format!("{:?}", credential).contains("secret-token"));
    }
}
