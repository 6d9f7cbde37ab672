//! Domain Services
//!
//! Pure functions over page HTML and video URLs.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::entities::OpenGraphData;

static OG_META_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*property=["']og:[^"']*["'][^>]*>"#).expect("valid regex")
});

static OG_PROPERTY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)property=["']og:([^"']*)["']"#).expect("valid regex"));

static META_CONTENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)content=["']([^"']*)["']"#).expect("valid regex"));

static TITLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title[^>]*>([^<]*)</title>").expect("valid regex"));

static META_DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*name=["']description["'][^>]*content=["']([^"']*)["']"#)
        .expect("valid regex")
});

static YOUTUBE_ID_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?:youtube\.com/watch\?v=|youtu\.be/|youtube\.com/embed/)([^&\n?#]+)")
            .expect("valid regex"),
        Regex::new(r"youtube\.com/v/([^&\n?#]+)").expect("valid regex"),
    ]
});

/// Extract Open Graph fields from page HTML
///
/// Later `og:` tags win over earlier ones. `<title>` and
/// `<meta name="description">` fill in when the `og:` tags are absent.
pub fn parse_open_graph(html: &str) -> OpenGraphData {
    let mut data = OpenGraphData::default();

    for tag in OG_META_TAG.find_iter(html) {
        let tag = tag.as_str();
        let (Some(property), Some(content)) = (OG_PROPERTY.captures(tag), META_CONTENT.captures(tag))
        else {
            continue;
        };
        let content = content[1].to_string();

        match property[1].to_ascii_lowercase().as_str() {
            "title" => data.title = Some(content),
            "description" => data.description = Some(content),
            "image" => data.image = Some(content),
            "url" => data.url = Some(content),
            _ => {}
        }
    }

    if data.title.is_none() {
        data.title = TITLE_TAG
            .captures(html)
            .map(|c| c[1].trim().to_string());
    }

    if data.description.is_none() {
        data.description = META_DESCRIPTION.captures(html).map(|c| c[1].to_string());
    }

    data
}

pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

/// Video ID of a `watch`, `youtu.be`, `embed` or `/v/` URL
pub fn extract_youtube_video_id(url: &str) -> Option<String> {
    YOUTUBE_ID_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(url))
        .map(|c| c[1].to_string())
}

pub fn youtube_thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/maxresdefault.jpg")
}

/// Fill a missing image with the YouTube thumbnail for YouTube URLs
pub fn apply_youtube_fallback(url: &str, data: &mut OpenGraphData) {
    if data.image.is_some() || !is_youtube_url(url) {
        return;
    }
    if let Some(id) = extract_youtube_video_id(url) {
        data.image = Some(youtube_thumbnail_url(&id));
    }
}
