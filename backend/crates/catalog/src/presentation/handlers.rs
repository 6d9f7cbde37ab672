//! HTTP Handlers

use std::marker::PhantomData;
use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::id::{VideoId, YouTuberId};
use platform::blob::BlobStore;
use platform::kv::KeyValueStore;

use crate::application::config::CatalogConfig;
use crate::application::export::ExportService;
use crate::application::health::HealthService;
use crate::application::images::{ImageService, ImageUpload};
use crate::application::open_graph::OpenGraphService;
use crate::application::videos::{CreateVideoInput, UpdateVideoInput, VideoService};
use crate::application::youtubers::{CreateYouTuberInput, UpdateYouTuberInput, YouTuberService};
use crate::domain::entities::ExportData;
use crate::domain::metadata::MetadataFetcher;
use crate::domain::repository::{DatabaseHealth, VideoRepository, YouTuberRepository};
use crate::error::{CatalogError, CatalogResult};
use crate::presentation::dto::*;
use crate::presentation::form::{CatalogBody, body_or_default, field_error};

/// Blob prefix of images sent inline with a YouTuber form
const YOUTUBER_IMAGE_PATH: &str = "youtubers";

/// Blob prefix of custom thumbnails sent inline with a video form
const VIDEO_IMAGE_PATH: &str = "videos";

/// Concrete store types behind the catalog handlers
pub trait CatalogBackend: Send + Sync + 'static {
    type Repo: YouTuberRepository + VideoRepository + DatabaseHealth + Send + Sync + 'static;
    type Fetcher: MetadataFetcher + Send + Sync + 'static;
    type Blobs: BlobStore + Send + Sync + 'static;
    type Kv: KeyValueStore + Send + Sync + 'static;
}

/// Shared state for catalog handlers
pub struct CatalogAppState<C: CatalogBackend> {
    pub repo: Arc<C::Repo>,
    pub fetcher: Arc<C::Fetcher>,
    pub blobs: Arc<C::Blobs>,
    pub kv: Arc<C::Kv>,
    pub config: Arc<CatalogConfig>,
    _backend: PhantomData<fn() -> C>,
}

impl<C: CatalogBackend> Clone for CatalogAppState<C> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            fetcher: self.fetcher.clone(),
            blobs: self.blobs.clone(),
            kv: self.kv.clone(),
            config: self.config.clone(),
            _backend: PhantomData,
        }
    }
}

impl<C: CatalogBackend> CatalogAppState<C> {
    pub fn new(
        repo: C::Repo,
        fetcher: C::Fetcher,
        blobs: C::Blobs,
        kv: C::Kv,
        config: CatalogConfig,
    ) -> Self {
        Self {
            repo: Arc::new(repo),
            fetcher: Arc::new(fetcher),
            blobs: Arc::new(blobs),
            kv: Arc::new(kv),
            config: Arc::new(config),
            _backend: PhantomData,
        }
    }

    pub fn youtubers(&self) -> YouTuberService<C::Repo> {
        YouTuberService::new(self.repo.clone())
    }

    pub fn videos(&self) -> VideoService<C::Repo, C::Fetcher, C::Blobs> {
        VideoService::new(self.repo.clone(), self.open_graph(), self.images())
    }

    pub fn images(&self) -> ImageService<C::Blobs> {
        ImageService::new(self.blobs.clone(), self.config.clone())
    }

    pub fn open_graph(&self) -> OpenGraphService<C::Fetcher> {
        OpenGraphService::new(self.fetcher.clone())
    }

    pub fn export(&self) -> ExportService<C::Repo, C::Blobs> {
        ExportService::new(self.repo.clone(), self.blobs.clone(), self.config.clone())
    }

    pub fn health(&self) -> HealthService<C::Repo, C::Kv, C::Blobs> {
        HealthService::new(self.repo.clone(), self.kv.clone(), self.blobs.clone())
    }
}

/// Store a form's inline image under `path`
async fn upload_inline<C: CatalogBackend>(
    state: &CatalogAppState<C>,
    image: Option<ImageUpload>,
    path: &str,
) -> CatalogResult<Option<String>> {
    let Some(mut image) = image else {
        return Ok(None);
    };
    image.path = Some(path.to_string());
    state.images().upload(image).await.map(Some)
}

fn youtuber_id(raw: &str) -> CatalogResult<YouTuberId> {
    raw.parse().map_err(|_| CatalogError::InvalidYouTuberId)
}

fn video_id(raw: &str) -> CatalogResult<VideoId> {
    raw.parse().map_err(|_| CatalogError::InvalidVideoId)
}

// ============================================================================
// YouTubers
// ============================================================================

/// GET /api/youtubers
pub async fn list_youtubers<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
) -> CatalogResult<Json<YouTubersResponse>> {
    let youtubers = state.youtubers().list().await?;
    Ok(Json(YouTubersResponse { youtubers }))
}

/// GET /api/youtubers/{id}
pub async fn get_youtuber<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<YouTuberResponse>> {
    let youtuber = state.youtubers().get(youtuber_id(&id)?).await?;
    Ok(Json(YouTuberResponse { youtuber }))
}

/// POST /api/youtubers
pub async fn create_youtuber<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
    CatalogBody { fields: req, image }: CatalogBody<YouTuberRequest>,
) -> CatalogResult<(StatusCode, Json<YouTuberResponse>)> {
    if req.name.as_deref().is_none_or(|name| name.trim().is_empty()) {
        return Err(CatalogError::NameRequired);
    }
    let uploaded = upload_inline(&state, image, YOUTUBER_IMAGE_PATH).await?;

    let youtuber = state
        .youtubers()
        .create(CreateYouTuberInput {
            name: req.name,
            tags: req.tags.map(|t| t.into_tags()).unwrap_or_default(),
            image_url: uploaded.or(req.image_url),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(YouTuberResponse { youtuber })))
}

/// PUT /api/youtubers/{id}
pub async fn update_youtuber<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
    Path(id): Path<String>,
    CatalogBody { fields: req, image }: CatalogBody<YouTuberRequest>,
) -> CatalogResult<Json<YouTuberResponse>> {
    let id = youtuber_id(&id)?;
    let uploaded = upload_inline(&state, image, YOUTUBER_IMAGE_PATH).await?;

    let youtuber = state
        .youtubers()
        .update(
            id,
            UpdateYouTuberInput {
                name: req.name,
                tags: req.tags.map(|t| t.into_tags()),
                image_url: uploaded.or(req.image_url),
            },
        )
        .await?;

    Ok(Json(YouTuberResponse { youtuber }))
}

/// DELETE /api/youtubers/{id}
pub async fn delete_youtuber<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<DeleteResponse>> {
    state.youtubers().delete(youtuber_id(&id)?).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "YouTuber deleted successfully",
    }))
}

// ============================================================================
// Videos
// ============================================================================

/// GET /api/videos
pub async fn list_videos<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
) -> CatalogResult<Json<VideosResponse>> {
    let videos = state.videos().list().await?;
    Ok(Json(VideosResponse { videos }))
}

/// GET /api/videos/{id}
pub async fn get_video<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<VideoResponse>> {
    let video = state.videos().get(video_id(&id)?).await?;
    Ok(Json(VideoResponse { video }))
}

/// POST /api/videos
pub async fn create_video<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
    CatalogBody { fields: req, image }: CatalogBody<VideoRequest>,
) -> CatalogResult<(StatusCode, Json<VideoResponse>)> {
    let uploaded = upload_inline(&state, image, VIDEO_IMAGE_PATH).await?;

    let video = state
        .videos()
        .create(CreateVideoInput {
            title: req.title,
            description: req.description,
            url: req.url,
            thumbnail_url: uploaded.or(req.thumbnail_url),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(VideoResponse { video })))
}

/// PUT /api/videos/{id}
pub async fn update_video<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
    Path(id): Path<String>,
    CatalogBody { fields: req, image }: CatalogBody<VideoRequest>,
) -> CatalogResult<Json<VideoResponse>> {
    let id = video_id(&id)?;
    let uploaded = upload_inline(&state, image, VIDEO_IMAGE_PATH).await?;

    let video = state
        .videos()
        .update(
            id,
            UpdateVideoInput {
                title: req.title,
                description: req.description,
                url: req.url,
                thumbnail_url: uploaded.or(req.thumbnail_url),
            },
        )
        .await?;

    Ok(Json(VideoResponse { video }))
}

/// DELETE /api/videos/{id}
pub async fn delete_video<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
    Path(id): Path<String>,
) -> CatalogResult<Json<DeleteResponse>> {
    state.videos().delete(video_id(&id)?).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "Video deleted successfully",
    }))
}

// ============================================================================
// Utilities
// ============================================================================

/// POST /api/utils/extract-og
pub async fn extract_open_graph<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
    body: Result<Json<ExtractOgRequest>, JsonRejection>,
) -> CatalogResult<Json<OpenGraphResponse>> {
    let req = body_or_default(body)?;
    let og_data = state.open_graph().extract_checked(req.url.as_deref()).await?;
    Ok(Json(OpenGraphResponse { og_data }))
}

/// POST /api/utils/upload-image
///
/// Multipart fields: `image` (file) and optional `path`.
pub async fn upload_image<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> CatalogResult<Json<UploadImageResponse>> {
    let mut multipart = multipart.map_err(|e| CatalogError::InvalidBody(e.body_text()))?;
    let max_mb = state.config.max_image_mb();
    let to_error = |e| field_error(e, max_mb);

    let mut upload = ImageUpload::default();
    while let Some(field) = multipart.next_field().await.map_err(to_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                upload.content_type = field.content_type().map(str::to_string);
                upload.file_name = field.file_name().map(str::to_string);
                upload.bytes = field.bytes().await.map_err(to_error)?.to_vec();
            }
            Some("path") => {
                upload.path = Some(field.text().await.map_err(to_error)?);
            }
            _ => {}
        }
    }

    let url = state.images().upload(upload).await?;

    Ok(Json(UploadImageResponse {
        success: true,
        url,
        message: "Image uploaded successfully",
    }))
}

/// GET /api/utils/images
pub async fn list_images<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
    Query(query): Query<ListImagesQuery>,
) -> CatalogResult<Json<ImageListResponse>> {
    let images = state
        .images()
        .list(query.prefix.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(ImageListResponse { images }))
}

/// GET /api/utils/export
pub async fn export_catalog<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
) -> CatalogResult<Json<ExportData>> {
    Ok(Json(state.export().export().await?))
}

/// GET /api/utils/health
pub async fn health_check<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
) -> (StatusCode, Json<HealthResponse>) {
    let services = state.health().check().await;
    let status = services.overall();
    let code = if status.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        code,
        Json(HealthResponse {
            status,
            services,
            timestamp: chrono::Utc::now(),
        }),
    )
}

// ============================================================================
// Image serving
// ============================================================================

/// GET /images/{*key}
///
/// Exports live in the same store but are only reachable through the
/// authenticated export endpoint.
pub async fn serve_image<C: CatalogBackend>(
    State(state): State<CatalogAppState<C>>,
    Path(key): Path<String>,
) -> CatalogResult<Response> {
    let export_prefix = format!("{}/", state.config.export_prefix.trim_end_matches('/'));
    if key.starts_with(&export_prefix) {
        return Err(CatalogError::ImageNotFound);
    }

    let blob = state.images().get(&key).await?;

    Ok((
        [
            (header::CONTENT_TYPE, blob.content_type),
            (
                header::CACHE_CONTROL,
                "public, max-age=31536000, immutable".to_string(),
            ),
        ],
        blob.bytes,
    )
        .into_response())
}
