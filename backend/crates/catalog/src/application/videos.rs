//! Video Use Cases
//!
//! Missing titles, descriptions and thumbnails are filled from the page's
//! Open Graph data. Scraped thumbnails are mirrored into the blob store;
//! a thumbnail supplied by the client is marked custom and left alone.

use std::sync::Arc;

use kernel::id::VideoId;
use platform::blob::BlobStore;

use crate::application::images::ImageService;
use crate::application::open_graph::OpenGraphService;
use crate::application::youtubers::non_empty;
use crate::domain::entities::{NewVideo, Video, VideoPatch};
use crate::domain::metadata::MetadataFetcher;
use crate::domain::repository::VideoRepository;
use crate::domain::value_objects::VideoUrl;
use crate::error::{CatalogError, CatalogResult};

/// Title stored when neither the client nor the page provides one
pub const UNTITLED_VIDEO: &str = "Untitled Video";

/// Blob prefix for mirrored thumbnails
const THUMBNAIL_PATH: &str = "videos";

/// Input for creating a video
#[derive(Debug, Clone, Default)]
pub struct CreateVideoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Custom thumbnail URL, usually from the upload endpoint
    pub thumbnail_url: Option<String>,
}

/// Input for updating a video
///
/// `description: Some("")` clears the description.
#[derive(Debug, Clone, Default)]
pub struct UpdateVideoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// Video service
pub struct VideoService<R, F, B>
where
    R: VideoRepository,
    F: MetadataFetcher,
    B: BlobStore,
{
    repo: Arc<R>,
    open_graph: OpenGraphService<F>,
    images: ImageService<B>,
}

impl<R, F, B> VideoService<R, F, B>
where
    R: VideoRepository + Send + Sync,
    F: MetadataFetcher + Send + Sync,
    B: BlobStore + Send + Sync,
{
    pub fn new(repo: Arc<R>, open_graph: OpenGraphService<F>, images: ImageService<B>) -> Self {
        Self {
            repo,
            open_graph,
            images,
        }
    }

    pub async fn list(&self) -> CatalogResult<Vec<Video>> {
        self.repo.list_videos().await
    }

    pub async fn get(&self, id: VideoId) -> CatalogResult<Video> {
        self.repo
            .get_video(id)
            .await?
            .ok_or(CatalogError::VideoNotFound)
    }

    pub async fn create(&self, input: CreateVideoInput) -> CatalogResult<Video> {
        let url = VideoUrl::parse(input.url.as_deref().unwrap_or_default())?;

        if self.repo.get_video_by_url(url.as_str()).await?.is_some() {
            return Err(CatalogError::DuplicateVideoUrl);
        }

        let mut title = non_empty(input.title);
        let mut description = non_empty(input.description);
        let mut thumbnail_url = non_empty(input.thumbnail_url);
        let is_custom_thumbnail = thumbnail_url.is_some();

        if !is_custom_thumbnail || title.is_none() || description.is_none() {
            let og = self.open_graph.extract(url.as_str()).await;

            title = title.or(og.title);
            description = description.or(og.description);

            if !is_custom_thumbnail && let Some(image) = og.image {
                thumbnail_url = self.mirror_thumbnail(&image).await;
            }
        }

        let video = self
            .repo
            .create_video(&NewVideo {
                title: title.unwrap_or_else(|| UNTITLED_VIDEO.to_string()),
                description,
                url: url.into_inner(),
                thumbnail_url,
                is_custom_thumbnail,
            })
            .await?;

        tracing::info!(
            video_id = %video.video_id,
            custom_thumbnail = video.is_custom_thumbnail,
            "Video created"
        );

        Ok(video)
    }

    pub async fn update(&self, id: VideoId, input: UpdateVideoInput) -> CatalogResult<Video> {
        let existing = self.get(id).await?;

        let mut patch = VideoPatch {
            title: non_empty(input.title),
            description: input.description.map(|d| non_empty(Some(d))),
            ..Default::default()
        };

        if let Some(raw) = non_empty(input.url)
            && raw != existing.url
        {
            let url = VideoUrl::parse(&raw)?;
            if let Some(other) = self.repo.get_video_by_url(url.as_str()).await?
                && other.video_id != id
            {
                return Err(CatalogError::UrlTakenByAnotherVideo);
            }
            patch.url = Some(url.into_inner());
        }

        let custom_thumbnail = non_empty(input.thumbnail_url);
        let has_custom_thumbnail = custom_thumbnail.is_some();
        if let Some(thumbnail) = custom_thumbnail {
            patch.thumbnail_url = Some(thumbnail);
            patch.is_custom_thumbnail = Some(true);
        }

        if !has_custom_thumbnail && let Some(new_url) = patch.url.as_deref() {
            let og = self.open_graph.extract(new_url).await;
            if let Some(image) = og.image
                && let Some(mirrored) = self.mirror_thumbnail(&image).await
            {
                patch.thumbnail_url = Some(mirrored);
                patch.is_custom_thumbnail = Some(false);
            }
        }

        let video = self
            .repo
            .update_video(id, &patch)
            .await?
            .ok_or(CatalogError::VideoNotFound)?;

        tracing::info!(video_id = %id, "Video updated");
        Ok(video)
    }

    pub async fn delete(&self, id: VideoId) -> CatalogResult<()> {
        if !self.repo.delete_video(id).await? {
            return Err(CatalogError::VideoNotFound);
        }

        tracing::info!(video_id = %id, "Video deleted");
        Ok(())
    }

    async fn mirror_thumbnail(&self, image_url: &str) -> Option<String> {
        self.images
            .mirror_remote(self.open_graph.fetcher(), image_url, THUMBNAIL_PATH)
            .await
    }
}
