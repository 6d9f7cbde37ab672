//! Domain Entities

use chrono::{DateTime, Utc};
use kernel::id::{VideoId, YouTuberId};
use serde::Serialize;

/// Catalogued creator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YouTuber {
    pub youtuber_id: YouTuberId,
    pub name: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new creator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewYouTuber {
    pub name: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
}

/// Partial update; `None` leaves the column unchanged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YouTuberPatch {
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
}

impl YouTuberPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.tags.is_none() && self.image_url.is_none()
    }
}

/// Catalogued video
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Video {
    pub video_id: VideoId,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub is_custom_thumbnail: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a new video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVideo {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub is_custom_thumbnail: bool,
}

/// Partial update; `None` leaves the column unchanged
///
/// `description: Some(None)` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_custom_thumbnail: Option<bool>,
}

impl VideoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.url.is_none()
            && self.thumbnail_url.is_none()
            && self.is_custom_thumbnail.is_none()
    }
}

/// Full catalog snapshot returned by the export endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ExportData {
    pub youtubers: Vec<YouTuber>,
    pub videos: Vec<Video>,
    pub exported_at: DateTime<Utc>,
    pub version: &'static str,
}

/// Open Graph fields scraped from a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpenGraphData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_patches() {
        assert!(YouTuberPatch::default().is_empty());
        assert!(VideoPatch::default().is_empty());

        let patch = VideoPatch {
            description: Some(None),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_og_data_omits_missing_fields() {
        let data = OpenGraphData {
            title: Some("t".into()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_string(&data).unwrap(), r#"{"title":"t"}"#);
    }
}
