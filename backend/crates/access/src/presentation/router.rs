//! Access Router
//!
//! `/api/auth` routes plus helpers that wrap other routers in the gates.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::domain::repository::RateLimitRepository;
use crate::presentation::handlers::{self, AccessAppState};
use crate::presentation::middleware::{
    rate_limit_gate, require_bearer_token, require_bearer_token_all_methods, require_csrf_token,
};

/// Create the `/api/auth` router
///
/// `/csrf` sits behind the rate-limit gate; `/login` runs its own check and
/// validates the CSRF token from the body.
pub fn access_router<R>(state: AccessAppState<R>) -> Router
where
    R: RateLimitRepository + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/csrf", get(handlers::issue_csrf_token::<R>))
        .route_layer(from_fn_with_state(state.clone(), rate_limit_gate::<R>))
        .route("/login", post(handlers::login::<R>))
        .with_state(state)
}

/// Gate a router: rate limit on every request, CSRF and bearer auth on
/// mutating requests
pub fn guard_mutations<R, S>(router: Router<S>, state: &AccessAppState<R>) -> Router<S>
where
    R: RateLimitRepository + Clone + Send + Sync + 'static,
    S: Clone + Send + Sync + 'static,
{
    // Last layer added runs first.
    router
        .route_layer(from_fn_with_state(state.csrf.clone(), require_bearer_token))
        .route_layer(from_fn_with_state(state.csrf.clone(), require_csrf_token))
        .route_layer(from_fn_with_state(state.clone(), rate_limit_gate::<R>))
}

/// Gate a router: rate limit and bearer auth on every request, CSRF on
/// mutating requests
pub fn guard_all<R, S>(router: Router<S>, state: &AccessAppState<R>) -> Router<S>
where
    R: RateLimitRepository + Clone + Send + Sync + 'static,
    S: Clone + Send + Sync + 'static,
{
    router
        .route_layer(from_fn_with_state(
            state.csrf.clone(),
            require_bearer_token_all_methods,
        ))
        .route_layer(from_fn_with_state(state.csrf.clone(), require_csrf_token))
        .route_layer(from_fn_with_state(state.clone(), rate_limit_gate::<R>))
}
