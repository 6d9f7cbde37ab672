//! Domain Value Objects

use std::fmt;

use serde::Deserialize;

use crate::error::CatalogError;

/// Tags as submitted by a client
///
/// Accepts a JSON array, a string holding a JSON array, or a
/// comma-separated string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Text(String),
}

impl TagsInput {
    /// Normalized tag list
    pub fn into_tags(self) -> Vec<String> {
        match self {
            TagsInput::List(tags) => tags,
            TagsInput::Text(text) => parse_tags(&text),
        }
    }
}

/// Parse a tags string: a JSON array if it is one, otherwise a comma list
pub fn parse_tags(text: &str) -> Vec<String> {
    if let Ok(tags) = serde_json::from_str::<Vec<String>>(text) {
        return tags;
    }
    text.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Absolute URL that parsed successfully
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoUrl(String);

impl VideoUrl {
    /// Validate a submitted URL, keeping the original text
    pub fn parse(raw: &str) -> Result<Self, CatalogError> {
        if raw.is_empty() {
            return Err(CatalogError::UrlRequired);
        }
        url::Url::parse(raw).map_err(|_| CatalogError::InvalidUrl)?;
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for VideoUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Image formats accepted for upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageType {
    /// Accepts `image/jpeg`, `image/jpg`, `image/png`, `image/webp`, `image/gif`
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageType::Jpeg),
            "image/png" => Some(ImageType::Png),
            "image/webp" => Some(ImageType::Webp),
            "image/gif" => Some(ImageType::Gif),
            _ => None,
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageType::Jpeg),
            "png" => Some(ImageType::Png),
            "webp" => Some(ImageType::Webp),
            "gif" => Some(ImageType::Gif),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
            ImageType::Webp => "image/webp",
            ImageType::Gif => "image/gif",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageType::Jpeg => "jpg",
            ImageType::Png => "png",
            ImageType::Webp => "webp",
            ImageType::Gif => "gif",
        }
    }
}

/// Extension of an uploaded file name, if it is a plain alphanumeric suffix
pub fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Image extension of a remote URL's path
pub fn extension_from_url(raw: &str) -> Option<ImageType> {
    let parsed = url::Url::parse(raw).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let ext = file_extension(last)?;
    ImageType::from_extension(&ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags_json_array() {
        assert_eq!(parse_tags(r#"["gaming","music"]"#), vec!["gaming", "music"]);
    }

    #[test]
    fn test_parse_tags_comma_list() {
        assert_eq!(
            parse_tags(" gaming, music ,, vlog "),
            vec!["gaming", "music", "vlog"]
        );
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn test_tags_input_untagged() {
        let list: TagsInput = serde_json::from_str(r#"["a","b"]"#).unwrap();
        assert_eq!(list.into_tags(), vec!["a", "b"]);

        let text: TagsInput = serde_json::from_str(r#""a, b""#).unwrap();
        assert_eq!(text.into_tags(), vec!["a", "b"]);
    }

    #[test]
    fn test_video_url() {
        assert!(matches!(VideoUrl::parse(""), Err(CatalogError::UrlRequired)));
        assert!(matches!(
            VideoUrl::parse("not a url"),
            Err(CatalogError::InvalidUrl)
        ));

        let url = VideoUrl::parse("https://www.youtube.com/watch?v=abc").unwrap();
        assert_eq!(url.as_str(), "https://www.youtube.com/watch?v=abc");
    }

    #[test]
    fn test_image_type_from_content_type() {
        assert_eq!(ImageType::from_content_type("image/jpg"), Some(ImageType::Jpeg));
        assert_eq!(
            ImageType::from_content_type("IMAGE/PNG; charset=binary"),
            Some(ImageType::Png)
        );
        assert_eq!(ImageType::from_content_type("image/svg+xml"), None);
        assert_eq!(ImageType::from_content_type("text/html"), None);
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.PNG"), Some("png".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension(".hidden"), None);
        assert_eq!(file_extension("evil.p/ng"), None);
    }

    #[test]
    fn test_extension_from_url() {
        assert_eq!(
            extension_from_url("https://img.youtube.com/vi/abc/maxresdefault.jpg"),
            Some(ImageType::Jpeg)
        );
        assert_eq!(extension_from_url("https://example.com/image?id=1"), None);
        assert_eq!(extension_from_url("not a url"), None);
    }
}
