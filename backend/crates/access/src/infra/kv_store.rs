//! Key-Value Rate Limit Repository
//!
//! Stores each record as JSON under `ratelimit:<fingerprint>`.

use std::time::Duration;

use platform::kv::KeyValueStore;

use crate::domain::entities::RateLimitRecord;
use crate::domain::repository::RateLimitRepository;
use crate::error::AccessResult;

const KEY_PREFIX: &str = "ratelimit:";

/// Storage key for a fingerprint
pub fn storage_key(fingerprint: &str) -> String {
    format!("{KEY_PREFIX}{fingerprint}")
}

/// Rate limit repository over any [`KeyValueStore`]
#[derive(Clone)]
pub struct KvRateLimitRepository<S> {
    store: S,
}

impl<S> KvRateLimitRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> RateLimitRepository for KvRateLimitRepository<S>
where
    S: KeyValueStore + Send + Sync,
{
    async fn load(&self, fingerprint: &str) -> AccessResult<RateLimitRecord> {
        let raw = self.store.get(&storage_key(fingerprint)).await?;
        Ok(RateLimitRecord::decode(raw.as_deref()))
    }

    async fn save(
        &self,
        fingerprint: &str,
        record: &RateLimitRecord,
        ttl: Duration,
    ) -> AccessResult<()> {
        self.store
            .put(&storage_key(fingerprint), record.encode(), ttl)
            .await?;
        Ok(())
    }

    async fn delete(&self, fingerprint: &str) -> AccessResult<()> {
        self.store.delete(&storage_key(fingerprint)).await?;
        Ok(())
    }
}
