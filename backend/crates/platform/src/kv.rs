//! Key-Value Store
//!
//! Narrow string KV interface with per-entry TTL, plus an in-memory
//! implementation. Durable implementations live next to the crate that owns
//! the database pool.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use thiserror::Error;

use crate::clock::{Clock, SystemClock};

/// KV store failure
///
/// Callers must treat this as a hard error; a failed read is never an
/// empty read.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("KV backend unavailable: {0}")]
    Unavailable(String),

    #[error("KV backend error: {0}")]
    Backend(String),
}

pub type KvResult<T> = Result<T, KvError>;

/// Key-value store with TTL
#[trait_variant::make(KeyValueStore: Send)]
pub trait LocalKeyValueStore {
    /// Get a value; expired entries read as `None`
    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Insert or replace a value that expires after `ttl`
    async fn put(&self, key: &str, value: String, ttl: Duration) -> KvResult<()>;

    /// Delete a value (missing keys are not an error)
    async fn delete(&self, key: &str) -> KvResult<()>;

    /// Liveness probe used by health checks
    async fn ping(&self) -> KvResult<()>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at_ms: i64,
}

/// In-memory KV store backed by `DashMap`
///
/// Expiry is evaluated lazily on read against the injected clock.
#[derive(Clone)]
pub struct MemoryKvStore {
    entries: Arc<DashMap<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryKvStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Number of live (unexpired) entries
    pub fn len(&self) -> usize {
        let now = self.clock.now_ms();
        self.entries
            .iter()
            .filter(|e| e.value().expires_at_ms > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let before = self.entries.len();
        self.entries.retain(|_, e| e.expires_at_ms > now);
        before - self.entries.len()
    }
}

impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        let now = self.clock.now_ms();
        let value = match self.entries.get(key) {
            Some(entry) if entry.expires_at_ms > now => Some(entry.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };
        if value.is_none() {
            self.entries.remove_if(key, |_, e| e.expires_at_ms <= now);
        }
        Ok(value)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> KvResult<()> {
        let expires_at_ms = self.clock.now_ms() + ttl.as_millis() as i64;
        self.entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at_ms,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn ping(&self) -> KvResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Arc, Duration, KeyValueStore, MemoryKvStore};
    use crate::clock::ManualClock;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryKvStore::new();
        assert_eq!(store.get("a").await.unwrap(), None);

        store
            .put("a", "1".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));

        store.delete("a").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), None);

        // deleting a missing key is fine
        store.delete("a").await.unwrap();
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let clock = Arc::new(ManualClock::new(10_000));
        let store = MemoryKvStore::with_clock(clock.clone());

        store
            .put("k", "v".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        clock.advance_ms(59_999);
        assert!(store.get("k").await.unwrap().is_some());

        clock.advance_ms(1);
        assert!(store.get("k").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let clock = Arc::new(ManualClock::new(0));
        let store = MemoryKvStore::with_clock(clock.clone());

        store
            .put("short", "x".to_string(), Duration::from_secs(1))
            .await
            .unwrap();
        store
            .put("long", "y".to_string(), Duration::from_secs(100))
            .await
            .unwrap();

        clock.advance_ms(5_000);
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
    }
}
