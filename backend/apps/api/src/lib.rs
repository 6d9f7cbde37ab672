//! API Server Assembly
//!
//! Wires the access gates in front of the catalog routers and applies the
//! response-wide layers (security headers, CORS, tracing).

pub mod config;

use access::{AccessAppState, RateLimitRepository, access_router, guard_all, guard_mutations};
use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::get,
};
use catalog::{
    CatalogAppState, CatalogBackend, HttpMetadataFetcher, MemoryCatalogRepository,
    PgCatalogRepository, images_router, utils_router, videos_router, youtubers_router,
};
use kernel::error::app_error::AppError;
use platform::blob::FsBlobStore;
use platform::kv::MemoryKvStore;
use serde_json::{Value, json};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

/// Origins always allowed in addition to `CORS_ORIGINS`
const DEFAULT_ORIGINS: [&str; 2] = ["http://localhost:8787", "https://localhost:8787"];

const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; img-src 'self' data: https:; \
     style-src 'self' 'unsafe-inline'; script-src 'self'; frame-ancestors 'none'";

/// PostgreSQL-backed catalog with images on disk
pub struct PostgresBackend;

impl CatalogBackend for PostgresBackend {
    type Repo = PgCatalogRepository;
    type Fetcher = HttpMetadataFetcher;
    type Blobs = FsBlobStore;
    type Kv = access::PgKvStore;
}

/// Database-less catalog with images on disk
pub struct InMemoryBackend;

impl CatalogBackend for InMemoryBackend {
    type Repo = MemoryCatalogRepository;
    type Fetcher = HttpMetadataFetcher;
    type Blobs = FsBlobStore;
    type Kv = MemoryKvStore;
}

/// Build the full application router
pub fn build_router<R, C>(
    access: AccessAppState<R>,
    catalog: CatalogAppState<C>,
    extra_origins: &[String],
) -> Router
where
    R: RateLimitRepository + Clone + Send + Sync + 'static,
    C: CatalogBackend,
{
    let api = Router::new()
        .nest("/auth", access_router(access.clone()))
        .nest(
            "/youtubers",
            guard_mutations(youtubers_router(catalog.clone()), &access),
        )
        .nest(
            "/videos",
            guard_mutations(videos_router(catalog.clone()), &access),
        )
        .nest("/utils", guard_all(utils_router(catalog.clone()), &access));

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .nest("/images", images_router(catalog))
        .fallback(not_found);

    with_security_headers(app)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(extra_origins))
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now(),
    }))
}

async fn not_found() -> AppError {
    AppError::not_found("Not found")
}

fn with_security_headers(router: Router) -> Router {
    let headers = [
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::X_FRAME_OPTIONS, "DENY"),
        (header::X_XSS_PROTECTION, "1; mode=block"),
        (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
        (
            HeaderName::from_static("permissions-policy"),
            "camera=(), microphone=(), geolocation=()",
        ),
        (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
    ];

    headers
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::if_not_present(
                name,
                HeaderValue::from_static(value),
            ))
        })
}

fn cors_layer(extra_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = DEFAULT_ORIGINS
        .iter()
        .map(|origin| origin.to_string())
        .chain(extra_origins.iter().cloned())
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(access::presentation::middleware::CSRF_HEADER),
        ]))
        .allow_credentials(true)
}
