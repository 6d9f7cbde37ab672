//! YouTuber Use Cases

use std::sync::Arc;

use kernel::id::YouTuberId;

use crate::domain::entities::{NewYouTuber, YouTuber, YouTuberPatch};
use crate::domain::repository::YouTuberRepository;
use crate::error::{CatalogError, CatalogResult};

/// Input for creating a YouTuber
#[derive(Debug, Clone, Default)]
pub struct CreateYouTuberInput {
    pub name: Option<String>,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
}

/// Input for updating a YouTuber; empty strings are treated as absent
#[derive(Debug, Clone, Default)]
pub struct UpdateYouTuberInput {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
}

/// YouTuber service
pub struct YouTuberService<R>
where
    R: YouTuberRepository,
{
    repo: Arc<R>,
}

impl<R> YouTuberService<R>
where
    R: YouTuberRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> CatalogResult<Vec<YouTuber>> {
        self.repo.list_youtubers().await
    }

    pub async fn get(&self, id: YouTuberId) -> CatalogResult<YouTuber> {
        self.repo
            .get_youtuber(id)
            .await?
            .ok_or(CatalogError::YouTuberNotFound)
    }

    pub async fn create(&self, input: CreateYouTuberInput) -> CatalogResult<YouTuber> {
        let name = non_empty(input.name).ok_or(CatalogError::NameRequired)?;

        let youtuber = self
            .repo
            .create_youtuber(&NewYouTuber {
                name,
                tags: input.tags,
                image_url: non_empty(input.image_url),
            })
            .await?;

        tracing::info!(youtuber_id = %youtuber.youtuber_id, "YouTuber created");
        Ok(youtuber)
    }

    pub async fn update(
        &self,
        id: YouTuberId,
        input: UpdateYouTuberInput,
    ) -> CatalogResult<YouTuber> {
        let patch = YouTuberPatch {
            name: non_empty(input.name),
            tags: input.tags,
            image_url: non_empty(input.image_url),
        };

        let youtuber = self
            .repo
            .update_youtuber(id, &patch)
            .await?
            .ok_or(CatalogError::YouTuberNotFound)?;

        tracing::info!(youtuber_id = %id, "YouTuber updated");
        Ok(youtuber)
    }

    pub async fn delete(&self, id: YouTuberId) -> CatalogResult<()> {
        if !self.repo.delete_youtuber(id).await? {
            return Err(CatalogError::YouTuberNotFound);
        }

        tracing::info!(youtuber_id = %id, "YouTuber deleted");
        Ok(())
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
