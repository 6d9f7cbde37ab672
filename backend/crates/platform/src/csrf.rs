//! CSRF Token Service
//!
//! Stateless, time-limited tokens of the form `nonce:timestamp_ms:hash` where
//! `hash = hex(HMAC-SHA256(secret, "nonce:timestamp_ms"))`.
//!
//! ## Limitations
//! Tokens are not single-use. A token verifies repeatedly until it is older
//! than `max_age`. The same format is reused as the bearer credential after
//! login, so anti-forgery and authentication share one secret.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::clock::Clock;
use crate::crypto::{constant_time_eq, hmac_sha256, random_hex};

/// Nonce length in bytes before hex encoding
pub const NONCE_BYTES: usize = 32;

/// Shortest nonce (in bytes) a token may carry
pub const MIN_NONCE_BYTES: usize = 16;

/// Default token lifetime (1 hour)
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(3600);

/// Issue a fresh token for `now_ms`
pub fn issue(secret: &[u8], now_ms: i64) -> String {
    issue_with_nonce(secret, &random_hex(NONCE_BYTES), now_ms)
}

/// Build the token for an explicit nonce and timestamp
///
/// Verification recomputes tokens through this function.
pub fn issue_with_nonce(secret: &[u8], nonce: &str, timestamp_ms: i64) -> String {
    let payload = format!("{nonce}:{timestamp_ms}");
    let hash = hex::encode(hmac_sha256(secret, payload.as_bytes()));
    format!("{payload}:{hash}")
}

/// Verify a presented token
///
/// Rejects tokens that are malformed, carry a non-integer timestamp, are
/// older than `max_age_ms`, or whose recomputed value differs.
pub fn verify(secret: &[u8], token: &str, now_ms: i64, max_age_ms: i64) -> bool {
    let mut parts = token.split(':');
    let (Some(nonce), Some(timestamp), Some(_hash), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    if nonce.len() < MIN_NONCE_BYTES * 2 {
        return false;
    }

    let Ok(timestamp_ms) = timestamp.parse::<i64>() else {
        return false;
    };

    if now_ms.saturating_sub(timestamp_ms) > max_age_ms {
        return false;
    }

    let expected = issue_with_nonce(secret, nonce, timestamp_ms);
    constant_time_eq(expected.as_bytes(), token.as_bytes())
}

/// Token service holding the process-wide secret, a clock and the lifetime
#[derive(Clone)]
pub struct CsrfTokenService {
    secret: Arc<Zeroizing<Vec<u8>>>,
    clock: Arc<dyn Clock>,
    max_age: Duration,
}

impl CsrfTokenService {
    pub fn new(secret: impl Into<Vec<u8>>, clock: Arc<dyn Clock>, max_age: Duration) -> Self {
        Self {
            secret: Arc::new(Zeroizing::new(secret.into())),
            clock,
            max_age,
        }
    }

    pub fn issue(&self) -> String {
        issue(&self.secret, self.clock.now_ms())
    }

    pub fn verify(&self, token: &str) -> bool {
        verify(
            &self.secret,
            token,
            self.clock.now_ms(),
            self.max_age.as_millis() as i64,
        )
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

impl fmt::Debug for CsrfTokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfTokenService")
            .field("secret", &"[REDACTED]")
            .field("max_age", &self.max_age)
            .finish()
    }
}
