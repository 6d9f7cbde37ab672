//! Application Configuration
//!
//! Configuration for the access-control layer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use platform::clock::Clock;
use platform::csrf::{CsrfTokenService, DEFAULT_MAX_AGE};
use platform::password::HashedPassword;
use platform::rate_limit::RateLimitConfig;

/// Access-control configuration
#[derive(Clone)]
pub struct AccessConfig {
    /// Stored admin password hash; login always fails without one
    pub admin_password_hash: Option<HashedPassword>,
    /// Secret used to sign CSRF and bearer tokens
    pub csrf_secret: Vec<u8>,
    /// Token lifetime
    pub csrf_max_age: Duration,
    /// Failure window and allowance
    pub rate_limit: RateLimitConfig,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            admin_password_hash: None,
            csrf_secret: Vec::new(),
            csrf_max_age: DEFAULT_MAX_AGE,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl AccessConfig {
    /// Create config with a random CSRF secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            csrf_secret: platform::crypto::random_bytes(32),
            ..Default::default()
        }
    }

    /// Create config for development with the given admin hash
    pub fn development(admin_password_hash: HashedPassword) -> Self {
        Self {
            admin_password_hash: Some(admin_password_hash),
            ..Self::with_random_secret()
        }
    }

    pub fn csrf_max_age_ms(&self) -> i64 {
        self.csrf_max_age.as_millis() as i64
    }

    pub fn rate_limit_window_ms(&self) -> i64 {
        self.rate_limit.window_ms()
    }

    /// Token service bound to this config's secret and lifetime
    pub fn csrf_service(&self, clock: Arc<dyn Clock>) -> CsrfTokenService {
        CsrfTokenService::new(self.csrf_secret.clone(), clock, self.csrf_max_age)
    }
}

impl fmt::Debug for AccessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessConfig")
            .field("admin_password_hash", &self.admin_password_hash)
            .field("csrf_secret", &"[REDACTED]")
            .field("csrf_max_age", &self.csrf_max_age)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}
