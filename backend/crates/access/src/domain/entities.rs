//! Domain Entities

use serde::{Deserialize, Serialize};

/// Per-fingerprint failure counter and lockout state
///
/// Stored as JSON `{"attempts", "lastAttempt", "timeoutUntil"?}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RateLimitRecord {
    /// Failed attempts in the current window
    pub attempts: u32,
    /// Unix ms of the latest failure (0 if none)
    pub last_attempt: i64,
    /// Unix ms until which the fingerprint is locked out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_until: Option<i64>,
}

impl RateLimitRecord {
    /// Decode a stored value
    ///
    /// Missing or undecodable values become the zero record.
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };
        match serde_json::from_str(raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Corrupt rate limit record, treating as empty");
                Self::default()
            }
        }
    }

    pub fn encode(&self) -> String {
        // Serializing plain integers cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Whether a lockout is in force at `now_ms`
    pub fn locked_until(&self, now_ms: i64) -> Option<i64> {
        self.timeout_until.filter(|&until| now_ms < until)
    }

    /// Whether the attempt window has passed since the latest failure
    pub fn window_elapsed(&self, now_ms: i64, window_ms: i64) -> bool {
        now_ms - self.last_attempt > window_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        let record = RateLimitRecord {
            attempts: 2,
            last_attempt: 1000,
            timeout_until: None,
        };
        assert_eq!(record.encode(), r#"{"attempts":2,"lastAttempt":1000}"#);

        let locked = RateLimitRecord {
            timeout_until: Some(5000),
            ..record
        };
        assert_eq!(
            locked.encode(),
            r#"{"attempts":2,"lastAttempt":1000,"timeoutUntil":5000}"#
        );
    }

    #[test]
    fn test_decode_defaults_missing_fields() {
        let record = RateLimitRecord::decode(Some(r#"{"attempts":1}"#));
        assert_eq!(record.attempts, 1);
        assert_eq!(record.last_attempt, 0);
        assert_eq!(record.timeout_until, None);
    }

    #[test]
    fn test_decode_corrupt_is_zero() {
        assert_eq!(RateLimitRecord::decode(None), RateLimitRecord::default());
        assert_eq!(
            RateLimitRecord::decode(Some("not json")),
            RateLimitRecord::default()
        );
        assert_eq!(
            RateLimitRecord::decode(Some(r#"{"attempts":-4}"#)),
            RateLimitRecord::default()
        );
        assert_eq!(
            RateLimitRecord::decode(Some(r#"{"attempts":"many"}"#)),
            RateLimitRecord::default()
        );
    }

    #[test]
    fn test_locked_until() {
        let record = RateLimitRecord {
            timeout_until: Some(2000),
            ..Default::default()
        };
        assert_eq!(record.locked_until(1999), Some(2000));
        assert_eq!(record.locked_until(2000), None);
        assert_eq!(RateLimitRecord::default().locked_until(0), None);
    }

    #[test]
    fn test_window_elapsed() {
        let record = RateLimitRecord {
            attempts: 1,
            last_attempt: 1000,
            timeout_until: None,
        };
        assert!(!record.window_elapsed(1900, 900));
        assert!(record.window_elapsed(1901, 900));
    }
}
