//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use platform::client::ClientFingerprint;
use platform::clock::Clock;
use platform::csrf::CsrfTokenService;
use platform::password::ClearTextPassword;

use crate::application::config::AccessConfig;
use crate::application::issue_csrf::IssueCsrfTokenUseCase;
use crate::application::login::{LoginInput, LoginUseCase};
use crate::application::rate_limit::RateLimiter;
use crate::domain::repository::RateLimitRepository;
use crate::error::AccessResult;
use crate::presentation::dto::{CsrfTokenResponse, LoginRequest, LoginResponse};

/// Shared state for access handlers and gates
#[derive(Clone)]
pub struct AccessAppState<R>
where
    R: RateLimitRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub csrf: CsrfTokenService,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AccessConfig>,
}

impl<R> AccessAppState<R>
where
    R: RateLimitRepository + Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, config: AccessConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            repo: Arc::new(repo),
            csrf: config.csrf_service(clock.clone()),
            clock,
            config: Arc::new(config),
        }
    }

    pub fn rate_limiter(&self) -> RateLimiter<R> {
        RateLimiter::new(
            self.repo.clone(),
            self.clock.clone(),
            self.config.rate_limit.clone(),
        )
    }
}

/// GET /api/auth/csrf
pub async fn issue_csrf_token<R>(State(state): State<AccessAppState<R>>) -> Json<CsrfTokenResponse>
where
    R: RateLimitRepository + Clone + Send + Sync + 'static,
{
    let use_case = IssueCsrfTokenUseCase::new(state.csrf.clone());

    Json(CsrfTokenResponse {
        csrf_token: use_case.execute(),
    })
}

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AccessAppState<R>>,
    fingerprint: ClientFingerprint,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> AccessResult<Json<LoginResponse>>
where
    R: RateLimitRepository + Clone + Send + Sync + 'static,
{
    let input = match body {
        Ok(Json(req)) => LoginInput {
            password: req.password.map(ClearTextPassword::new),
            csrf_token: req.csrf_token,
        },
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable login body");
            LoginInput {
                password: None,
                csrf_token: None,
            }
        }
    };

    let use_case = LoginUseCase::new(
        state.rate_limiter(),
        state.csrf.clone(),
        state.config.clone(),
    );

    let output = use_case.execute(input, &fingerprint).await?;

    Ok(Json(LoginResponse {
        success: true,
        token: output.token,
        message: "Authentication successful".to_string(),
    }))
}
