//! Catalog Routers
//!
//! Each router is returned unguarded; the API binary wraps the mutating
//! ones in the access gates before nesting.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::presentation::handlers::{self, CatalogAppState, CatalogBackend};

/// Multipart framing allowance on top of the image limit
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// `/api/youtubers`
///
/// Write bodies may carry an inline image, so they share the upload limit.
pub fn youtubers_router<C: CatalogBackend>(state: CatalogAppState<C>) -> Router {
    let form_limit = state.config.max_image_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/",
            get(handlers::list_youtubers::<C>).post(handlers::create_youtuber::<C>),
        )
        .route(
            "/{id}",
            get(handlers::get_youtuber::<C>)
                .put(handlers::update_youtuber::<C>)
                .delete(handlers::delete_youtuber::<C>),
        )
        .layer(DefaultBodyLimit::max(form_limit))
        .with_state(state)
}

/// `/api/videos`
pub fn videos_router<C: CatalogBackend>(state: CatalogAppState<C>) -> Router {
    let form_limit = state.config.max_image_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route(
            "/",
            get(handlers::list_videos::<C>).post(handlers::create_video::<C>),
        )
        .route(
            "/{id}",
            get(handlers::get_video::<C>)
                .put(handlers::update_video::<C>)
                .delete(handlers::delete_video::<C>),
        )
        .layer(DefaultBodyLimit::max(form_limit))
        .with_state(state)
}

/// `/api/utils`
pub fn utils_router<C: CatalogBackend>(state: CatalogAppState<C>) -> Router {
    let upload_limit = state.config.max_image_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/extract-og", post(handlers::extract_open_graph::<C>))
        .route(
            "/upload-image",
            post(handlers::upload_image::<C>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/images", get(handlers::list_images::<C>))
        .route("/export", get(handlers::export_catalog::<C>))
        .route("/health", get(handlers::health_check::<C>))
        .with_state(state)
}

/// `/images`, public
pub fn images_router<C: CatalogBackend>(state: CatalogAppState<C>) -> Router {
    Router::new()
        .route("/{*key}", get(handlers::serve_image::<C>))
        .with_state(state)
}
