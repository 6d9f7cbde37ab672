//! Creator & Video Catalog Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, Open Graph parsing, repository traits
//! - `application/` - YouTuber, video, image, export and health use cases
//! - `infra/` - PostgreSQL and in-memory repositories, HTTP metadata fetcher
//! - `presentation/` - HTTP handlers and routers
//!
//! ## Data Model
//! - Video URLs are unique; duplicates are rejected with 409
//! - Missing video metadata is filled from the page's Open Graph tags, with a
//!   YouTube thumbnail fallback
//! - Images live in a blob store under `<path>/<unix_ms>_<random>.<ext>` and
//!   are served publicly from `/images/<key>`; exports are not

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::CatalogConfig;
pub use domain::metadata::{FetchedImage, MetadataFetcher};
pub use error::{CatalogError, CatalogResult};
pub use infra::http::HttpMetadataFetcher;
pub use infra::memory::MemoryCatalogRepository;
pub use infra::postgres::PgCatalogRepository;
pub use presentation::handlers::{CatalogAppState, CatalogBackend};
pub use presentation::router::{images_router, utils_router, videos_router, youtubers_router};
