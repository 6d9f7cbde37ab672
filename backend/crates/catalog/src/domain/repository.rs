//! Repository Traits
//!
//! Interfaces for catalog persistence. Implementations are in the
//! infrastructure layer. Lists are ordered newest first.

use kernel::id::{VideoId, YouTuberId};

use crate::domain::entities::{NewVideo, NewYouTuber, Video, VideoPatch, YouTuber, YouTuberPatch};
use crate::error::CatalogResult;

/// YouTuber repository trait
#[trait_variant::make(YouTuberRepository: Send)]
pub trait LocalYouTuberRepository {
    async fn list_youtubers(&self) -> CatalogResult<Vec<YouTuber>>;

    async fn get_youtuber(&self, id: YouTuberId) -> CatalogResult<Option<YouTuber>>;

    async fn create_youtuber(&self, youtuber: &NewYouTuber) -> CatalogResult<YouTuber>;

    /// Apply a patch, returning `None` when the row does not exist
    async fn update_youtuber(
        &self,
        id: YouTuberId,
        patch: &YouTuberPatch,
    ) -> CatalogResult<Option<YouTuber>>;

    /// Returns `false` when nothing was deleted
    async fn delete_youtuber(&self, id: YouTuberId) -> CatalogResult<bool>;
}

/// Video repository trait
#[trait_variant::make(VideoRepository: Send)]
pub trait LocalVideoRepository {
    async fn list_videos(&self) -> CatalogResult<Vec<Video>>;

    async fn get_video(&self, id: VideoId) -> CatalogResult<Option<Video>>;

    async fn get_video_by_url(&self, url: &str) -> CatalogResult<Option<Video>>;

    /// Fails with `DuplicateVideoUrl` when the URL is taken
    async fn create_video(&self, video: &NewVideo) -> CatalogResult<Video>;

    /// Apply a patch, returning `None` when the row does not exist
    async fn update_video(&self, id: VideoId, patch: &VideoPatch) -> CatalogResult<Option<Video>>;

    /// Returns `false` when nothing was deleted
    async fn delete_video(&self, id: VideoId) -> CatalogResult<bool>;
}

/// Database liveness probe
#[trait_variant::make(DatabaseHealth: Send)]
pub trait LocalDatabaseHealth {
    async fn ping(&self) -> CatalogResult<()>;
}
