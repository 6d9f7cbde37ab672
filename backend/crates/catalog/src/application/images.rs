//! Image Use Cases
//!
//! Uploads, remote mirroring and serving of images kept in the blob store.
//! Keys look like `<path>/<unix_ms>_<random>.<ext>`.

use std::sync::Arc;

use platform::blob::{Blob, BlobError, BlobStore, validate_key};

use crate::application::config::CatalogConfig;
use crate::domain::metadata::MetadataFetcher;
use crate::domain::value_objects::{ImageType, extension_from_url, file_extension};
use crate::error::{CatalogError, CatalogResult};

/// Image submitted through the upload endpoint
#[derive(Debug, Default)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
    /// Blob prefix; the configured default when absent
    pub path: Option<String>,
}

/// Image service over a blob store
pub struct ImageService<B>
where
    B: BlobStore,
{
    blobs: Arc<B>,
    config: Arc<CatalogConfig>,
}

impl<B> ImageService<B>
where
    B: BlobStore + Send + Sync,
{
    pub fn new(blobs: Arc<B>, config: Arc<CatalogConfig>) -> Self {
        Self { blobs, config }
    }

    /// Validate and store an upload, returning its public URL
    pub async fn upload(&self, upload: ImageUpload) -> CatalogResult<String> {
        if upload.bytes.is_empty() {
            return Err(CatalogError::ImageRequired);
        }

        let image_type = upload
            .content_type
            .as_deref()
            .and_then(ImageType::from_content_type)
            .ok_or(CatalogError::InvalidImageType)?;

        if upload.bytes.len() > self.config.max_image_bytes {
            return Err(CatalogError::ImageTooLarge {
                max_mb: self.config.max_image_mb(),
            });
        }

        let ext = upload
            .file_name
            .as_deref()
            .and_then(file_extension)
            .unwrap_or_else(|| image_type.extension().to_string());
        let path = self.upload_path(upload.path.as_deref());
        let key = new_image_key(&path, &ext);

        self.put(&key, upload.bytes, image_type).await?;

        Ok(self.config.image_url(&key))
    }

    /// Download a remote image into the store
    ///
    /// Any failure is logged and yields `None`; callers treat the image as
    /// optional.
    pub async fn mirror_remote<F>(&self, fetcher: &F, url: &str, path: &str) -> Option<String>
    where
        F: MetadataFetcher + Sync,
    {
        let image = match fetcher.fetch_image(url).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Image download failed");
                return None;
            }
        };

        if image.bytes.is_empty() || image.bytes.len() > self.config.max_image_bytes {
            tracing::warn!(url = %url, bytes = image.bytes.len(), "Remote image rejected by size");
            return None;
        }

        let image_type = extension_from_url(url)
            .or_else(|| {
                image
                    .content_type
                    .as_deref()
                    .and_then(ImageType::from_content_type)
            })
            .unwrap_or(ImageType::Jpeg);
        let key = new_image_key(path, image_type.extension());

        match self.put(&key, image.bytes, image_type).await {
            Ok(()) => Some(self.config.image_url(&key)),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Storing remote image failed");
                None
            }
        }
    }

    /// Stored image by key
    pub async fn get(&self, key: &str) -> CatalogResult<Blob> {
        match self.blobs.get(key).await {
            Ok(Some(blob)) => Ok(blob),
            Ok(None) | Err(BlobError::InvalidKey(_)) => Err(CatalogError::ImageNotFound),
            Err(e) => Err(e.into()),
        }
    }

    /// Stored keys under `prefix`
    pub async fn list(&self, prefix: &str) -> CatalogResult<Vec<String>> {
        Ok(self.blobs.list(prefix).await?)
    }

    async fn put(&self, key: &str, bytes: Vec<u8>, image_type: ImageType) -> CatalogResult<()> {
        validate_key(key).map_err(|_| CatalogError::InvalidImagePath)?;

        let size = bytes.len();
        self.blobs
            .put(key, bytes, image_type.content_type())
            .await?;

        tracing::info!(key = %key, bytes = size, "Image stored");
        Ok(())
    }

    fn upload_path(&self, requested: Option<&str>) -> String {
        match requested.map(|p| p.trim().trim_matches('/')) {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => self.config.default_image_path.clone(),
        }
    }
}

/// Fresh key under `path`
pub fn new_image_key(path: &str, ext: &str) -> String {
    format!(
        "{}/{}_{}.{}",
        path,
        chrono::Utc::now().timestamp_millis(),
        platform::crypto::random_hex(6),
        ext
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metadata::FetchedImage;
    use platform::blob::MemoryBlobStore;

    fn service() -> (ImageService<MemoryBlobStore>, Arc<MemoryBlobStore>) {
        let blobs = Arc::new(MemoryBlobStore::new());
        let service = ImageService::new(blobs.clone(), Arc::new(CatalogConfig::default()));
        (service, blobs)
    }

    fn png_upload(path: Option<&str>) -> ImageUpload {
        ImageUpload {
            bytes: vec![0x89, b'P', b'N', b'G'],
            content_type: Some("image/png".into()),
            file_name: Some("avatar.png".into()),
            path: path.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_upload_stores_under_path() {
        let (service, blobs) = service();

        let url = service.upload(png_upload(Some("youtubers"))).await.unwrap();

        assert!(url.starts_with("/images/youtubers/"));
        assert!(url.ends_with(".png"));

        let key = url.trim_start_matches("/images/");
        let blob = blobs.get(key).await.unwrap().unwrap();
        assert_eq!(blob.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_upload_default_path() {
        let (service, _) = service();
        let url = service.upload(png_upload(None)).await.unwrap();
        assert!(url.starts_with("/images/general/"));

        let url = service.upload(png_upload(Some("  "))).await.unwrap();
        assert!(url.starts_with("/images/general/"));
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file() {
        let (service, _) = service();
        let upload = ImageUpload {
            bytes: Vec::new(),
            ..png_upload(None)
        };
        assert!(matches!(
            service.upload(upload).await,
            Err(CatalogError::ImageRequired)
        ));
    }

    #[tokio::test]
    async fn test_upload_rejects_wrong_type() {
        let (service, _) = service();
        let upload = ImageUpload {
            content_type: Some("image/svg+xml".into()),
            ..png_upload(None)
        };
        assert!(matches!(
            service.upload(upload).await,
            Err(CatalogError::InvalidImageType)
        ));
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_file() {
        let (service, _) = service();
        let upload = ImageUpload {
            bytes: vec![0u8; 10 * 1024 * 1024 + 1],
            ..png_upload(None)
        };
        let err = service.upload(upload).await.unwrap_err();
        assert_eq!(err.to_string(), "File too large. Maximum size is 10MB.");
    }

    #[tokio::test]
    async fn test_upload_rejects_traversal_path() {
        let (service, _) = service();
        assert!(matches!(
            service.upload(png_upload(Some("../etc"))).await,
            Err(CatalogError::InvalidImagePath)
        ));
    }

    #[tokio::test]
    async fn test_get_missing_or_invalid_is_not_found() {
        let (service, _) = service();
        assert!(matches!(
            service.get("videos/none.png").await,
            Err(CatalogError::ImageNotFound)
        ));
        assert!(matches!(
            service.get("../secret").await,
            Err(CatalogError::ImageNotFound)
        ));
    }

    struct StaticFetcher(Option<FetchedImage>);

    impl MetadataFetcher for StaticFetcher {
        async fn fetch_page(&self, _url: &str) -> CatalogResult<String> {
            Err(CatalogError::Fetch("no pages".into()))
        }

        async fn fetch_image(&self, _url: &str) -> CatalogResult<FetchedImage> {
            self.0
                .clone()
                .ok_or_else(|| CatalogError::Fetch("404".into()))
        }
    }

    #[tokio::test]
    async fn test_mirror_remote_uses_url_extension() {
        let (service, blobs) = service();
        let fetcher = StaticFetcher(Some(FetchedImage {
            bytes: vec![1, 2, 3],
            content_type: Some("image/webp".into()),
        }));

        let url = service
            .mirror_remote(&fetcher, "https://img.youtube.com/vi/x/maxresdefault.jpg", "videos")
            .await
            .unwrap();

        assert!(url.starts_with("/images/videos/"));
        assert!(url.ends_with(".jpg"));
        assert_eq!(blobs.list("videos/").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mirror_remote_failure_is_none() {
        let (service, blobs) = service();
        let fetcher = StaticFetcher(None);

        let url = service
            .mirror_remote(&fetcher, "https://example.com/a.png", "videos")
            .await;

        assert_eq!(url, None);
        assert!(blobs.list("").await.unwrap().is_empty());
    }
}
