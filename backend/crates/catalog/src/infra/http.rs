//! HTTP Metadata Fetcher
//!
//! `reqwest` client for scraping third-party pages and downloading their
//! preview images.

use reqwest::header::CONTENT_TYPE;

use crate::application::config::CatalogConfig;
use crate::domain::metadata::{FetchedImage, MetadataFetcher};
use crate::error::{CatalogError, CatalogResult};

/// HTTP-backed metadata fetcher
#[derive(Clone)]
pub struct HttpMetadataFetcher {
    client: reqwest::Client,
    max_image_bytes: usize,
}

impl HttpMetadataFetcher {
    pub fn new(config: &CatalogConfig) -> CatalogResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.fetch_user_agent.as_str())
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| CatalogError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_image_bytes: config.max_image_bytes,
        })
    }

    async fn get(&self, url: &str) -> CatalogResult<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Fetch(format!("HTTP {status} from {url}")));
        }

        Ok(response)
    }
}

impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch_page(&self, url: &str) -> CatalogResult<String> {
        self.get(url)
            .await?
            .text()
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))
    }

    async fn fetch_image(&self, url: &str) -> CatalogResult<FetchedImage> {
        let response = self.get(url).await?;

        if let Some(len) = response.content_length()
            && len > self.max_image_bytes as u64
        {
            return Err(CatalogError::Fetch(format!("image too large: {len} bytes")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Fetch(e.to_string()))?;

        Ok(FetchedImage {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}
