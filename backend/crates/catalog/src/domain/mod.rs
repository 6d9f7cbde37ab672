//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (YouTuber, Video, ExportData, OpenGraphData)
//! - Domain value objects (TagsInput, VideoUrl, ImageType)
//! - Repository and fetcher traits (interfaces)
//! - Domain services (Open Graph parsing, YouTube URL helpers)

pub mod entities;
pub mod metadata;
pub mod repository;
pub mod services;
pub mod value_objects;
