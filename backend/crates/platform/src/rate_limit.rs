//! Rate Limiting Infrastructure
//!
//! Window configuration and the progressive lockout schedule shared by the
//! rate-limit use cases.

use std::time::Duration;

/// Lockout tiers, 1-based, clamped to the last entry
pub const LOCKOUT_SCHEDULE: [Duration; 4] = [
    Duration::from_secs(15 * 60),
    Duration::from_secs(30 * 60),
    Duration::from_secs(60 * 60),
    Duration::from_secs(24 * 60 * 60),
];

/// Shortest TTL a rate-limit record is stored with
pub const MIN_RECORD_TTL: Duration = Duration::from_secs(60);

/// Rate limit configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum failures allowed in the window
    pub max_attempts: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            window: Duration::from_millis(900_000),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_attempts: u32, window_ms: u64) -> Self {
        Self {
            max_attempts,
            window: Duration::from_millis(window_ms),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window.as_millis() as i64
    }

    /// TTL for stored records: max(60 s, window)
    pub fn record_ttl(&self) -> Duration {
        Duration::from_secs(self.window.as_secs()).max(MIN_RECORD_TTL)
    }
}

/// Lockout tier for a cumulative attempt count
///
/// Reaching `max_attempts` and the attempt after it are tier 1; each
/// further attempt in the same window moves one tier up.
pub fn lockout_tier(attempts: u32, max_attempts: u32) -> u32 {
    attempts.saturating_sub(max_attempts).max(1)
}

/// Lockout duration for a 1-based tier
///
/// Zero is treated as the first tier and anything past the schedule stays at
/// the last tier.
pub fn lockout_duration(tier: u32) -> Duration {
    let index = (tier.max(1) as usize - 1).min(LOCKOUT_SCHEDULE.len() - 1);
    LOCKOUT_SCHEDULE[index]
}

/// Seconds remaining until `until_ms`, rounded up
pub fn retry_after_secs(until_ms: i64, now_ms: i64) -> u64 {
    let remaining = until_ms.saturating_sub(now_ms).max(0) as u64;
    remaining.div_ceil(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lockout_schedule() {
        assert_eq!(lockout_duration(0), Duration::from_secs(900));
        assert_eq!(lockout_duration(1), Duration::from_secs(900));
        assert_eq!(lockout_duration(2), Duration::from_secs(1800));
        assert_eq!(lockout_duration(3), Duration::from_secs(3600));
        assert_eq!(lockout_duration(4), Duration::from_secs(86_400));
        assert_eq!(lockout_duration(50), Duration::from_secs(86_400));
    }

    #[test]
    fn test_lockout_tier() {
        assert_eq!(lockout_tier(3, 3), 1);
        assert_eq!(lockout_tier(4, 3), 1);
        assert_eq!(lockout_tier(5, 3), 2);
        assert_eq!(lockout_tier(6, 3), 3);
        assert_eq!(lockout_duration(lockout_tier(3, 3)), Duration::from_secs(900));
        assert_eq!(lockout_duration(lockout_tier(5, 3)), Duration::from_secs(1800));
        assert_eq!(lockout_duration(lockout_tier(9, 3)), Duration::from_secs(86_400));
    }

    #[test]
    fn test_record_ttl() {
        assert_eq!(RateLimitConfig::default().record_ttl(), Duration::from_secs(900));
        assert_eq!(RateLimitConfig::new(3, 5_000).record_ttl(), MIN_RECORD_TTL);
    }

    #[test]
    fn test_retry_after_rounds_up() {
        assert_eq!(retry_after_secs(10_000, 0), 10);
        assert_eq!(retry_after_secs(10_001, 0), 11);
        assert_eq!(retry_after_secs(0, 5_000), 0);
    }
}
