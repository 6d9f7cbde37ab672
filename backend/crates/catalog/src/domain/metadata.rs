//! Remote Metadata
//!
//! Interface for fetching third-party pages and images. The HTTP
//! implementation is in the infrastructure layer.

use crate::error::CatalogResult;

/// Image downloaded from a remote URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub bytes: Vec<u8>,
    /// `Content-Type` reported by the remote server, if any
    pub content_type: Option<String>,
}

/// Fetcher for remote pages and images
#[trait_variant::make(MetadataFetcher: Send)]
pub trait LocalMetadataFetcher {
    /// Body of an HTML page; non-success statuses are errors
    async fn fetch_page(&self, url: &str) -> CatalogResult<String>;

    /// Bytes of a remote image; non-success statuses are errors
    async fn fetch_image(&self, url: &str) -> CatalogResult<FetchedImage>;
}
