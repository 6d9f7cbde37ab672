//! Application Configuration
//!
//! Configuration for catalog use cases.

use std::time::Duration;

/// Catalog configuration
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Largest accepted image upload
    pub max_image_bytes: usize,
    /// Blob prefix used when an upload names no path
    pub default_image_path: String,
    /// Public URL prefix under which blobs are served
    pub image_url_prefix: String,
    /// Blob prefix for stored exports
    pub export_prefix: String,
    /// Timeout for Open Graph page and image fetches
    pub fetch_timeout: Duration,
    /// `User-Agent` sent with Open Graph fetches
    pub fetch_user_agent: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: 10 * 1024 * 1024,
            default_image_path: "general".to_string(),
            image_url_prefix: "/images".to_string(),
            export_prefix: "exports".to_string(),
            fetch_timeout: Duration::from_secs(10),
            fetch_user_agent: "Mozilla/5.0 (compatible; YouTube-Showcase-Bot/1.0)".to_string(),
        }
    }
}

impl CatalogConfig {
    /// Create config for development (short fetch timeout)
    pub fn development() -> Self {
        Self {
            fetch_timeout: Duration::from_secs(5),
            ..Default::default()
        }
    }

    pub fn max_image_mb(&self) -> usize {
        self.max_image_bytes / (1024 * 1024)
    }

    /// Public URL of a stored blob
    pub fn image_url(&self, key: &str) -> String {
        format!("{}/{}", self.image_url_prefix.trim_end_matches('/'), key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.max_image_mb(), 10);
        assert_eq!(config.image_url("videos/a.png"), "/images/videos/a.png");
    }
}
