//! Access Gates
//!
//! Request gates applied in this order: rate limit, CSRF, bearer auth.
//! Install them with `axum::middleware::from_fn_with_state`.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Method, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use platform::client::{ClientFingerprint, fingerprint};
use platform::csrf::CsrfTokenService;

use crate::domain::repository::RateLimitRepository;
use crate::domain::value_objects::BearerCredential;
use crate::error::AccessError;
use crate::presentation::handlers::AccessAppState;

/// Header carrying the CSRF token on mutating requests
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Methods that change server state
pub fn is_mutating(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::DELETE | Method::PATCH
    )
}

fn request_fingerprint(req: &Request<Body>) -> ClientFingerprint {
    let direct_ip = req
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|info| info.0.ip());

    fingerprint(req.headers(), direct_ip)
}

/// Reject locked-out fingerprints with 429
pub async fn rate_limit_gate<R>(
    State(state): State<AccessAppState<R>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    R: RateLimitRepository + Clone + Send + Sync + 'static,
{
    let fp = request_fingerprint(&req);

    let decision = match state.rate_limiter().check(fp.as_str()).await {
        Ok(decision) => decision,
        Err(e) => return e.into_response(),
    };

    if let Err(e) = decision.into_result() {
        tracing::warn!(client_ip = %fp.ip, path = %req.uri().path(), "Rate limited");
        return e.into_response();
    }

    next.run(req).await
}

/// Require a valid `X-CSRF-Token` on mutating requests
pub async fn require_csrf_token(
    State(csrf): State<CsrfTokenService>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !is_mutating(req.method()) {
        return next.run(req).await;
    }

    let token = req
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty());

    let Some(token) = token else {
        return AccessError::CsrfTokenMissing.into_response();
    };

    if !csrf.verify(token) {
        return AccessError::CsrfTokenInvalid.into_response();
    }

    next.run(req).await
}

/// Require a valid bearer token on mutating requests
pub async fn require_bearer_token(
    State(csrf): State<CsrfTokenService>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if !is_mutating(req.method()) {
        return next.run(req).await;
    }
    authenticate(&csrf, req, next).await
}

/// Require a valid bearer token on every request
pub async fn require_bearer_token_all_methods(
    State(csrf): State<CsrfTokenService>,
    req: Request<Body>,
    next: Next,
) -> Response {
    authenticate(&csrf, req, next).await
}

async fn authenticate(csrf: &CsrfTokenService, mut req: Request<Body>, next: Next) -> Response {
    let Some(credential) = BearerCredential::from_headers(req.headers()) else {
        return AccessError::Unauthorized.into_response();
    };

    if !csrf.verify(credential.as_str()) {
        return AccessError::TokenInvalid.into_response();
    }

    req.extensions_mut().insert(credential);
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_mutating() {
        assert!(is_mutating(&Method::POST));
        assert!(is_mutating(&Method::PUT));
        assert!(is_mutating(&Method::DELETE));
        assert!(is_mutating(&Method::PATCH));
        assert!(!is_mutating(&Method::GET));
        assert!(!is_mutating(&Method::HEAD));
        assert!(!is_mutating(&Method::OPTIONS));
    }
}
