//! Open Graph Use Case
//!
//! A page that cannot be fetched yields empty data, never an error.

use std::sync::Arc;

use crate::domain::entities::OpenGraphData;
use crate::domain::metadata::MetadataFetcher;
use crate::domain::services::{apply_youtube_fallback, parse_open_graph};
use crate::domain::value_objects::VideoUrl;
use crate::error::CatalogResult;

/// Open Graph extraction over a fetcher
pub struct OpenGraphService<F>
where
    F: MetadataFetcher,
{
    fetcher: Arc<F>,
}

impl<F> OpenGraphService<F>
where
    F: MetadataFetcher + Send + Sync,
{
    pub fn new(fetcher: Arc<F>) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Scrape `url`, falling back to the YouTube thumbnail for YouTube pages
    pub async fn extract(&self, url: &str) -> OpenGraphData {
        let html = match self.fetcher.fetch_page(url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Open Graph fetch failed");
                return OpenGraphData::default();
            }
        };

        let mut data = parse_open_graph(&html);
        apply_youtube_fallback(url, &mut data);
        data
    }

    /// Validate a client-supplied URL, then scrape it
    pub async fn extract_checked(&self, raw_url: Option<&str>) -> CatalogResult<OpenGraphData> {
        let url = VideoUrl::parse(raw_url.unwrap_or_default())?;
        Ok(self.extract(url.as_str()).await)
    }
}
