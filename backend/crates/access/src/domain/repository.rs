//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use std::time::Duration;

use crate::domain::entities::RateLimitRecord;
use crate::error::AccessResult;

/// Rate limit record repository, keyed by fingerprint hex
#[trait_variant::make(RateLimitRepository: Send)]
pub trait LocalRateLimitRepository {
    /// Load the record; absent or corrupt records load as the zero record
    async fn load(&self, fingerprint: &str) -> AccessResult<RateLimitRecord>;

    /// Persist the record with the given TTL
    async fn save(
        &self,
        fingerprint: &str,
        record: &RateLimitRecord,
        ttl: Duration,
    ) -> AccessResult<()>;

    /// Remove the record
    async fn delete(&self, fingerprint: &str) -> AccessResult<()>;
}
