//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::health::{ServiceStatus, ServicesHealth};
use crate::domain::entities::{OpenGraphData, Video, YouTuber};
use crate::domain::value_objects::TagsInput;
use crate::presentation::form::FormFields;

/// Body for POST/PUT /api/youtubers
///
/// As a multipart form the `image` part replaces `image_url`.
#[derive(Debug, Default, Deserialize)]
pub struct YouTuberRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Body for POST/PUT /api/videos
///
/// As a multipart form the `custom_thumbnail` part replaces `thumbnail_url`.
#[derive(Debug, Default, Deserialize)]
pub struct VideoRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl FormFields for YouTuberRequest {
    const IMAGE_FIELD: &'static str = "image";

    fn set_field(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = Some(value),
            // blank tags leave the stored tags alone
            "tags" if !value.trim().is_empty() => self.tags = Some(TagsInput::Text(value)),
            "image_url" => self.image_url = Some(value),
            _ => {}
        }
    }
}

impl FormFields for VideoRequest {
    const IMAGE_FIELD: &'static str = "custom_thumbnail";

    fn set_field(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = Some(value),
            "description" => self.description = Some(value),
            "url" => self.url = Some(value),
            "thumbnail_url" => self.thumbnail_url = Some(value),
            _ => {}
        }
    }
}

/// Body for POST /api/utils/extract-og
#[derive(Debug, Default, Deserialize)]
pub struct ExtractOgRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Query for GET /api/utils/images
#[derive(Debug, Default, Deserialize)]
pub struct ListImagesQuery {
    #[serde(default)]
    pub prefix: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct YouTuberResponse {
    pub youtuber: YouTuber,
}

#[derive(Debug, Serialize)]
pub struct YouTubersResponse {
    pub youtubers: Vec<YouTuber>,
}

#[derive(Debug, Serialize)]
pub struct VideoResponse {
    pub video: Video,
}

#[derive(Debug, Serialize)]
pub struct VideosResponse {
    pub videos: Vec<Video>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct OpenGraphResponse {
    #[serde(rename = "ogData")]
    pub og_data: OpenGraphData,
}

#[derive(Debug, Serialize)]
pub struct UploadImageResponse {
    pub success: bool,
    pub url: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ImageListResponse {
    pub images: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ServiceStatus,
    pub services: ServicesHealth,
    pub timestamp: DateTime<Utc>,
}
