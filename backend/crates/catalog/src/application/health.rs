//! Health Check Use Case
//!
//! Probes the database, the key-value store and the blob store with a small
//! write-then-read round trip where the backend supports it.

use std::sync::Arc;
use std::time::Duration;

use platform::blob::BlobStore;
use platform::kv::KeyValueStore;
use serde::Serialize;

use crate::domain::repository::DatabaseHealth;

const KV_PROBE_KEY: &str = "health-check";
const BLOB_PROBE_KEY: &str = "health-check.txt";
const PROBE_VALUE: &str = "ok";

/// Health of one dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Unhealthy,
}

impl ServiceStatus {
    fn from_ok(ok: bool) -> Self {
        if ok {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Unhealthy
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, ServiceStatus::Healthy)
    }
}

/// Per-dependency health
#[derive(Debug, Clone, Serialize)]
pub struct ServicesHealth {
    pub database: ServiceStatus,
    pub kv: ServiceStatus,
    pub blob: ServiceStatus,
}

impl ServicesHealth {
    pub fn overall(&self) -> ServiceStatus {
        ServiceStatus::from_ok(
            self.database.is_healthy() && self.kv.is_healthy() && self.blob.is_healthy(),
        )
    }
}

/// Health check service
pub struct HealthService<D, K, B>
where
    D: DatabaseHealth,
    K: KeyValueStore,
    B: BlobStore,
{
    database: Arc<D>,
    kv: Arc<K>,
    blobs: Arc<B>,
}

impl<D, K, B> HealthService<D, K, B>
where
    D: DatabaseHealth + Send + Sync,
    K: KeyValueStore + Send + Sync,
    B: BlobStore + Send + Sync,
{
    pub fn new(database: Arc<D>, kv: Arc<K>, blobs: Arc<B>) -> Self {
        Self {
            database,
            kv,
            blobs,
        }
    }

    pub async fn check(&self) -> ServicesHealth {
        let (database, kv, blob) = tokio::join!(self.check_database(), self.check_kv(), self.check_blob());

        let health = ServicesHealth {
            database: ServiceStatus::from_ok(database),
            kv: ServiceStatus::from_ok(kv),
            blob: ServiceStatus::from_ok(blob),
        };

        if !health.overall().is_healthy() {
            tracing::warn!(?health, "Health check failed");
        }

        health
    }

    async fn check_database(&self) -> bool {
        match self.database.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Database health probe failed");
                false
            }
        }
    }

    async fn check_kv(&self) -> bool {
        let probe = async {
            self.kv
                .put(KV_PROBE_KEY, PROBE_VALUE.to_string(), Duration::from_secs(60))
                .await?;
            self.kv.get(KV_PROBE_KEY).await
        };

        match probe.await {
            Ok(value) => value.as_deref() == Some(PROBE_VALUE),
            Err(e) => {
                tracing::error!(error = %e, "KV health probe failed");
                false
            }
        }
    }

    async fn check_blob(&self) -> bool {
        let probe = async {
            self.blobs
                .put(BLOB_PROBE_KEY, PROBE_VALUE.as_bytes().to_vec(), "text/plain")
                .await?;
            self.blobs.get(BLOB_PROBE_KEY).await
        };

        match probe.await {
            Ok(blob) => blob.is_some(),
            Err(e) => {
                tracing::error!(error = %e, "Blob health probe failed");
                false
            }
        }
    }
}
