//! Login Use Case
//!
//! Order of checks: rate limit, required fields, CSRF token, password.
//! Only a wrong password counts as a failed attempt.

use std::sync::Arc;

use platform::client::ClientFingerprint;
use platform::csrf::CsrfTokenService;
use platform::password::ClearTextPassword;

use crate::application::config::AccessConfig;
use crate::application::rate_limit::RateLimiter;
use crate::domain::repository::RateLimitRepository;
use crate::error::{AccessError, AccessResult};

/// Input DTO for login
#[derive(Debug)]
pub struct LoginInput {
    pub password: Option<ClearTextPassword>,
    pub csrf_token: Option<String>,
}

/// Output DTO for login
#[derive(Debug, Clone)]
pub struct LoginOutput {
    /// New token to present as `Authorization: Bearer`
    pub token: String,
}

/// Login Use Case
pub struct LoginUseCase<R>
where
    R: RateLimitRepository,
{
    rate_limiter: RateLimiter<R>,
    csrf: CsrfTokenService,
    config: Arc<AccessConfig>,
}

impl<R> LoginUseCase<R>
where
    R: RateLimitRepository,
{
    pub fn new(
        rate_limiter: RateLimiter<R>,
        csrf: CsrfTokenService,
        config: Arc<AccessConfig>,
    ) -> Self {
        Self {
            rate_limiter,
            csrf,
            config,
        }
    }

    pub async fn execute(
        &self,
        input: LoginInput,
        fingerprint: &ClientFingerprint,
    ) -> AccessResult<LoginOutput> {
        self.rate_limiter
            .check(fingerprint.as_str())
            .await?
            .into_result()?;

        let (Some(password), Some(csrf_token)) = (input.password, input.csrf_token) else {
            return Err(AccessError::MissingCredentials);
        };
        if password.is_empty() || csrf_token.is_empty() {
            return Err(AccessError::MissingCredentials);
        }

        if !self.csrf.verify(&csrf_token) {
            return Err(AccessError::CsrfTokenInvalid);
        }

        if !self.verify_password(password).await? {
            let attempts = self.rate_limiter.record_failure(fingerprint.as_str()).await?;
            tracing::warn!(
                client_ip = %fingerprint.ip,
                attempts,
                "Login failed"
            );
            return Err(AccessError::InvalidPassword);
        }

        self.rate_limiter.reset(fingerprint.as_str()).await?;

        tracing::info!(client_ip = %fingerprint.ip, "Login succeeded");

        Ok(LoginOutput {
            token: self.csrf.issue(),
        })
    }

    /// PBKDF2 runs on the blocking pool
    async fn verify_password(&self, password: ClearTextPassword) -> AccessResult<bool> {
        let Some(hash) = self.config.admin_password_hash.clone() else {
            tracing::warn!("No admin password hash configured; rejecting login");
            return Ok(false);
        };
        let matched = tokio::task::spawn_blocking(move || hash.verify(&password)).await?;
        Ok(matched)
    }
}
