//! In-Memory Repository
//!
//! Catalog repository for tests and database-less runs. Enforces the same
//! unique-URL rule as the SQL schema.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use kernel::id::{VideoId, YouTuberId};
use tokio::sync::RwLock;

use crate::domain::entities::{NewVideo, NewYouTuber, Video, VideoPatch, YouTuber, YouTuberPatch};
use crate::domain::repository::{DatabaseHealth, VideoRepository, YouTuberRepository};
use crate::error::{CatalogError, CatalogResult};

#[derive(Default)]
struct Tables {
    youtubers: BTreeMap<i64, YouTuber>,
    videos: BTreeMap<i64, Video>,
    next_youtuber_id: i64,
    next_video_id: i64,
}

/// In-memory catalog repository
#[derive(Clone, Default)]
pub struct MemoryCatalogRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Newest first; ids break timestamp ties
fn newest_first<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
    items
}

impl YouTuberRepository for MemoryCatalogRepository {
    async fn list_youtubers(&self) -> CatalogResult<Vec<YouTuber>> {
        let tables = self.tables.read().await;
        let all = tables.youtubers.values().cloned().collect();
        Ok(newest_first(all, |y: &YouTuber| {
            (y.created_at, y.youtuber_id.value())
        }))
    }

    async fn get_youtuber(&self, id: YouTuberId) -> CatalogResult<Option<YouTuber>> {
        Ok(self.tables.read().await.youtubers.get(&id.value()).cloned())
    }

    async fn create_youtuber(&self, youtuber: &NewYouTuber) -> CatalogResult<YouTuber> {
        let mut tables = self.tables.write().await;
        tables.next_youtuber_id += 1;
        let id = tables.next_youtuber_id;
        let now = Utc::now();

        let created = YouTuber {
            youtuber_id: YouTuberId::new(id),
            name: youtuber.name.clone(),
            tags: youtuber.tags.clone(),
            image_url: youtuber.image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.youtubers.insert(id, created.clone());

        Ok(created)
    }

    async fn update_youtuber(
        &self,
        id: YouTuberId,
        patch: &YouTuberPatch,
    ) -> CatalogResult<Option<YouTuber>> {
        let mut tables = self.tables.write().await;
        let Some(youtuber) = tables.youtubers.get_mut(&id.value()) else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(youtuber.clone()));
        }

        if let Some(name) = &patch.name {
            youtuber.name = name.clone();
        }
        if let Some(tags) = &patch.tags {
            youtuber.tags = tags.clone();
        }
        if let Some(image_url) = &patch.image_url {
            youtuber.image_url = Some(image_url.clone());
        }
        youtuber.updated_at = Utc::now();

        Ok(Some(youtuber.clone()))
    }

    async fn delete_youtuber(&self, id: YouTuberId) -> CatalogResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .youtubers
            .remove(&id.value())
            .is_some())
    }
}

impl VideoRepository for MemoryCatalogRepository {
    async fn list_videos(&self) -> CatalogResult<Vec<Video>> {
        let tables = self.tables.read().await;
        let all = tables.videos.values().cloned().collect();
        Ok(newest_first(all, |v: &Video| (v.created_at, v.video_id.value())))
    }

    async fn get_video(&self, id: VideoId) -> CatalogResult<Option<Video>> {
        Ok(self.tables.read().await.videos.get(&id.value()).cloned())
    }

    async fn get_video_by_url(&self, url: &str) -> CatalogResult<Option<Video>> {
        let tables = self.tables.read().await;
        Ok(tables.videos.values().find(|v| v.url == url).cloned())
    }

    async fn create_video(&self, video: &NewVideo) -> CatalogResult<Video> {
        let mut tables = self.tables.write().await;
        if tables.videos.values().any(|v| v.url == video.url) {
            return Err(CatalogError::DuplicateVideoUrl);
        }

        tables.next_video_id += 1;
        let id = tables.next_video_id;
        let now = Utc::now();

        let created = Video {
            video_id: VideoId::new(id),
            title: video.title.clone(),
            description: video.description.clone(),
            url: video.url.clone(),
            thumbnail_url: video.thumbnail_url.clone(),
            is_custom_thumbnail: video.is_custom_thumbnail,
            created_at: now,
            updated_at: now,
        };
        tables.videos.insert(id, created.clone());

        Ok(created)
    }

    async fn update_video(&self, id: VideoId, patch: &VideoPatch) -> CatalogResult<Option<Video>> {
        let mut tables = self.tables.write().await;

        if let Some(url) = &patch.url
            && tables
                .videos
                .values()
                .any(|v| v.url == *url && v.video_id != id)
        {
            return Err(CatalogError::UrlTakenByAnotherVideo);
        }

        let Some(video) = tables.videos.get_mut(&id.value()) else {
            return Ok(None);
        };
        if patch.is_empty() {
            return Ok(Some(video.clone()));
        }

        if let Some(title) = &patch.title {
            video.title = title.clone();
        }
        if let Some(description) = &patch.description {
            video.description = description.clone();
        }
        if let Some(url) = &patch.url {
            video.url = url.clone();
        }
        if let Some(thumbnail_url) = &patch.thumbnail_url {
            video.thumbnail_url = Some(thumbnail_url.clone());
        }
        if let Some(is_custom) = patch.is_custom_thumbnail {
            video.is_custom_thumbnail = is_custom;
        }
        video.updated_at = Utc::now();

        Ok(Some(video.clone()))
    }

    async fn delete_video(&self, id: VideoId) -> CatalogResult<bool> {
        Ok(self
            .tables
            .write()
            .await
            .videos
            .remove(&id.value())
            .is_some())
    }
}

impl DatabaseHealth for MemoryCatalogRepository {
    async fn ping(&self) -> CatalogResult<()> {
        Ok(())
    }
}
