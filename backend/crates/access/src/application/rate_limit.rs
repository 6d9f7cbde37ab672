//! Rate Limit Use Case
//!
//! Progressive lockout keyed by client fingerprint. Every store failure is
//! returned as an error; a broken store never lets a request through.
//!
//! `record_failure` is a read-modify-write across two store calls, so two
//! concurrent failures from the same fingerprint can lose one increment.

use std::sync::Arc;
use std::time::Duration;

use platform::clock::Clock;
use platform::rate_limit::{RateLimitConfig, lockout_duration, lockout_tier};

use crate::domain::entities::RateLimitRecord;
use crate::domain::repository::RateLimitRepository;
use crate::domain::value_objects::RateLimitDecision;
use crate::error::AccessResult;

/// Rate limiter over a record repository
pub struct RateLimiter<R>
where
    R: RateLimitRepository,
{
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
    config: RateLimitConfig,
}

impl<R> RateLimiter<R>
where
    R: RateLimitRepository,
{
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>, config: RateLimitConfig) -> Self {
        Self {
            repo,
            clock,
            config,
        }
    }

    /// Decide whether the fingerprint may proceed
    ///
    /// An expired window resets the count in memory only. Reaching the
    /// allowance starts (and persists) a lockout.
    pub async fn check(&self, fingerprint: &str) -> AccessResult<RateLimitDecision> {
        let now = self.clock.now_ms();
        let mut record = self.repo.load(fingerprint).await?;

        if let Some(until) = record.locked_until(now) {
            return Ok(RateLimitDecision::blocked(until, now));
        }

        if record.window_elapsed(now, self.config.window_ms()) {
            record.attempts = 0;
        }

        if record.attempts >= self.config.max_attempts {
            let tier = lockout_tier(record.attempts, self.config.max_attempts);
            let until = now + lockout_duration(tier).as_millis() as i64;
            record.timeout_until = Some(until);

            self.repo
                .save(fingerprint, &record, self.ttl_for(&record, now))
                .await?;

            tracing::warn!(
                fingerprint = %fingerprint,
                attempts = record.attempts,
                tier,
                "Lockout started"
            );

            return Ok(RateLimitDecision::blocked(until, now));
        }

        Ok(RateLimitDecision::Allowed)
    }

    /// Count a failed attempt, returning the attempts in the current window
    pub async fn record_failure(&self, fingerprint: &str) -> AccessResult<u32> {
        let now = self.clock.now_ms();
        let mut record = self.repo.load(fingerprint).await?;

        if record.window_elapsed(now, self.config.window_ms()) {
            record.attempts = 0;
        }
        record.attempts = record.attempts.saturating_add(1);
        record.last_attempt = now;

        self.repo
            .save(fingerprint, &record, self.ttl_for(&record, now))
            .await?;

        tracing::info!(
            fingerprint = %fingerprint,
            attempts = record.attempts,
            "Failed attempt recorded"
        );

        Ok(record.attempts)
    }

    /// Forget the fingerprint's history
    pub async fn reset(&self, fingerprint: &str) -> AccessResult<()> {
        self.repo.delete(fingerprint).await
    }

    /// Window TTL, stretched to cover an active lockout
    fn ttl_for(&self, record: &RateLimitRecord, now: i64) -> Duration {
        let base = self.config.record_ttl();
        match record.locked_until(now) {
            Some(until) => base.max(Duration::from_millis((until - now) as u64)),
            None => base,
        }
    }
}
