//! Export Use Case
//!
//! Snapshots the whole catalog and keeps a copy in the blob store.

use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use platform::blob::BlobStore;

use crate::application::config::CatalogConfig;
use crate::domain::entities::ExportData;
use crate::domain::repository::{VideoRepository, YouTuberRepository};
use crate::error::{CatalogError, CatalogResult};

/// Version tag written into every export
pub const EXPORT_VERSION: &str = "1.0.0";

/// Export service
pub struct ExportService<R, B>
where
    R: YouTuberRepository + VideoRepository,
    B: BlobStore,
{
    repo: Arc<R>,
    blobs: Arc<B>,
    config: Arc<CatalogConfig>,
}

impl<R, B> ExportService<R, B>
where
    R: YouTuberRepository + VideoRepository + Send + Sync,
    B: BlobStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, blobs: Arc<B>, config: Arc<CatalogConfig>) -> Self {
        Self {
            repo,
            blobs,
            config,
        }
    }

    /// Build the snapshot and store it as pretty JSON under the export prefix
    pub async fn export(&self) -> CatalogResult<ExportData> {
        let data = ExportData {
            youtubers: self.repo.list_youtubers().await?,
            videos: self.repo.list_videos().await?,
            exported_at: Utc::now(),
            version: EXPORT_VERSION,
        };

        let key = export_key(&self.config.export_prefix, &data);
        let body = serde_json::to_vec_pretty(&data)
            .map_err(|e| CatalogError::Internal(e.to_string()))?;
        self.blobs.put(&key, body, "application/json").await?;

        tracing::info!(
            key = %key,
            youtubers = data.youtubers.len(),
            videos = data.videos.len(),
            "Catalog exported"
        );

        Ok(data)
    }
}

/// `<prefix>/export-<timestamp>.json` with `:` and `.` replaced by `-`
pub fn export_key(prefix: &str, data: &ExportData) -> String {
    let stamp = data
        .exported_at
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{}/export-{}.json", prefix.trim_end_matches('/'), stamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_export_key() {
        let data = ExportData {
            youtubers: Vec::new(),
            videos: Vec::new(),
            exported_at: Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            version: EXPORT_VERSION,
        };
        assert_eq!(
            export_key("exports", &data),
            "exports/export-2025-01-02T03-04-05-000Z.json"
        );
    }
}
