//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::{VideoId, YouTuberId};
use sqlx::PgPool;

use crate::domain::entities::{NewVideo, NewYouTuber, Video, VideoPatch, YouTuber, YouTuberPatch};
use crate::domain::repository::{DatabaseHealth, VideoRepository, YouTuberRepository};
use crate::error::{CatalogError, CatalogResult};

const YOUTUBER_COLUMNS: &str = "youtuber_id, name, tags, image_url, created_at, updated_at";

const VIDEO_COLUMNS: &str =
    "video_id, title, description, url, thumbnail_url, is_custom_thumbnail, created_at, updated_at";

/// PostgreSQL-backed catalog repository
#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

impl YouTuberRepository for PgCatalogRepository {
    async fn list_youtubers(&self) -> CatalogResult<Vec<YouTuber>> {
        let rows = sqlx::query_as::<_, YouTuberRow>(&format!(
            "SELECT {YOUTUBER_COLUMNS} FROM youtubers ORDER BY created_at DESC, youtuber_id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(YouTuberRow::into_youtuber).collect())
    }

    async fn get_youtuber(&self, id: YouTuberId) -> CatalogResult<Option<YouTuber>> {
        let row = sqlx::query_as::<_, YouTuberRow>(&format!(
            "SELECT {YOUTUBER_COLUMNS} FROM youtubers WHERE youtuber_id = $1"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(YouTuberRow::into_youtuber))
    }

    async fn create_youtuber(&self, youtuber: &NewYouTuber) -> CatalogResult<YouTuber> {
        let row = sqlx::query_as::<_, YouTuberRow>(&format!(
            r#"
            INSERT INTO youtubers (name, tags, image_url)
            VALUES ($1, $2, $3)
            RETURNING {YOUTUBER_COLUMNS}
            "#
        ))
        .bind(&youtuber.name)
        .bind(&youtuber.tags)
        .bind(&youtuber.image_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_youtuber())
    }

    async fn update_youtuber(
        &self,
        id: YouTuberId,
        patch: &YouTuberPatch,
    ) -> CatalogResult<Option<YouTuber>> {
        if patch.is_empty() {
            return self.get_youtuber(id).await;
        }

        let row = sqlx::query_as::<_, YouTuberRow>(&format!(
            r#"
            UPDATE youtubers SET
                name = COALESCE($2, name),
                tags = COALESCE($3, tags),
                image_url = COALESCE($4, image_url),
                updated_at = NOW()
            WHERE youtuber_id = $1
            RETURNING {YOUTUBER_COLUMNS}
            "#
        ))
        .bind(id.value())
        .bind(&patch.name)
        .bind(&patch.tags)
        .bind(&patch.image_url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(YouTuberRow::into_youtuber))
    }

    async fn delete_youtuber(&self, id: YouTuberId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM youtubers WHERE youtuber_id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

impl VideoRepository for PgCatalogRepository {
    async fn list_videos(&self) -> CatalogResult<Vec<Video>> {
        let rows = sqlx::query_as::<_, VideoRow>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos ORDER BY created_at DESC, video_id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(VideoRow::into_video).collect())
    }

    async fn get_video(&self, id: VideoId) -> CatalogResult<Option<Video>> {
        let row = sqlx::query_as::<_, VideoRow>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE video_id = $1"
        ))
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(VideoRow::into_video))
    }

    async fn get_video_by_url(&self, url: &str) -> CatalogResult<Option<Video>> {
        let row = sqlx::query_as::<_, VideoRow>(&format!(
            "SELECT {VIDEO_COLUMNS} FROM videos WHERE url = $1"
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(VideoRow::into_video))
    }

    async fn create_video(&self, video: &NewVideo) -> CatalogResult<Video> {
        let row = sqlx::query_as::<_, VideoRow>(&format!(
            r#"
            INSERT INTO videos (title, description, url, thumbnail_url, is_custom_thumbnail)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.url)
        .bind(&video.thumbnail_url)
        .bind(video.is_custom_thumbnail)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::DuplicateVideoUrl
            } else {
                CatalogError::Database(e)
            }
        })?;

        Ok(row.into_video())
    }

    async fn update_video(&self, id: VideoId, patch: &VideoPatch) -> CatalogResult<Option<Video>> {
        if patch.is_empty() {
            return self.get_video(id).await;
        }

        let row = sqlx::query_as::<_, VideoRow>(&format!(
            r#"
            UPDATE videos SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                url = COALESCE($5, url),
                thumbnail_url = COALESCE($6, thumbnail_url),
                is_custom_thumbnail = COALESCE($7, is_custom_thumbnail),
                updated_at = NOW()
            WHERE video_id = $1
            RETURNING {VIDEO_COLUMNS}
            "#
        ))
        .bind(id.value())
        .bind(&patch.title)
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(&patch.url)
        .bind(&patch.thumbnail_url)
        .bind(patch.is_custom_thumbnail)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CatalogError::UrlTakenByAnotherVideo
            } else {
                CatalogError::Database(e)
            }
        })?;

        Ok(row.map(VideoRow::into_video))
    }

    async fn delete_video(&self, id: VideoId) -> CatalogResult<bool> {
        let deleted = sqlx::query("DELETE FROM videos WHERE video_id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

impl DatabaseHealth for PgCatalogRepository {
    async fn ping(&self) -> CatalogResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// Internal row types for sqlx mapping
#[derive(sqlx::FromRow)]
struct YouTuberRow {
    youtuber_id: i64,
    name: String,
    tags: Vec<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl YouTuberRow {
    fn into_youtuber(self) -> YouTuber {
        YouTuber {
            youtuber_id: YouTuberId::new(self.youtuber_id),
            name: self.name,
            tags: self.tags,
            image_url: self.image_url,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct VideoRow {
    video_id: i64,
    title: String,
    description: Option<String>,
    url: String,
    thumbnail_url: Option<String>,
    is_custom_thumbnail: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VideoRow {
    fn into_video(self) -> Video {
        Video {
            video_id: VideoId::new(self.video_id),
            title: self.title,
            description: self.description,
            url: self.url,
            thumbnail_url: self.thumbnail_url,
            is_custom_thumbnail: self.is_custom_thumbnail,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
