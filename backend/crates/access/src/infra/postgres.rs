//! PostgreSQL Key-Value Store
//!
//! Durable [`KeyValueStore`] over the `kv_entries` table. Expired rows are
//! invisible to reads and removed by [`PgKvStore::cleanup_expired`].

use std::sync::Arc;
use std::time::Duration;

use platform::clock::{Clock, SystemClock};
use platform::kv::{KeyValueStore, KvError, KvResult};
use sqlx::PgPool;

fn kv_error(err: sqlx::Error) -> KvError {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            KvError::Unavailable(err.to_string())
        }
        other => KvError::Backend(other.to_string()),
    }
}

/// PostgreSQL-backed KV store
#[derive(Clone)]
pub struct PgKvStore {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PgKvStore {
    pub fn new(pool: PgPool) -> Self {
        Self::with_clock(pool, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    /// Delete expired entries
    pub async fn cleanup_expired(&self) -> KvResult<u64> {
        let deleted = sqlx::query("DELETE FROM kv_entries WHERE expires_at_ms <= $1")
            .bind(self.clock.now_ms())
            .execute(&self.pool)
            .await
            .map_err(kv_error)?
            .rows_affected();

        Ok(deleted)
    }
}

impl KeyValueStore for PgKvStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT value FROM kv_entries WHERE key = $1 AND expires_at_ms > $2",
        )
        .bind(key)
        .bind(self.clock.now_ms())
        .fetch_optional(&self.pool)
        .await
        .map_err(kv_error)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> KvResult<()> {
        let expires_at_ms = self.clock.now_ms() + ttl.as_millis() as i64;

        sqlx::query(
            r#"
            INSERT INTO kv_entries (key, value, expires_at_ms)
            VALUES ($1, $2, $3)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, expires_at_ms = EXCLUDED.expires_at_ms
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(expires_at_ms)
        .execute(&self.pool)
        .await
        .map_err(kv_error)?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        sqlx::query("DELETE FROM kv_entries WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(kv_error)?;
        Ok(())
    }

    async fn ping(&self) -> KvResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(kv_error)?;
        Ok(())
    }
}
