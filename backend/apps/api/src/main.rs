//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::net::SocketAddr;
use std::sync::Arc;

use access::{AccessAppState, KvRateLimitRepository, PgKvStore};
use api::config::{Cli, Command, ServeArgs};
use api::{InMemoryBackend, PostgresBackend, build_router};
use catalog::{CatalogAppState, HttpMetadataFetcher, MemoryCatalogRepository, PgCatalogRepository};
use clap::Parser;
use platform::blob::FsBlobStore;
use platform::clock::{Clock, SystemClock};
use platform::kv::MemoryKvStore;
use platform::password::validate_password_strength;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,access=info,catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::HashPassword { password }) => {
            hash_password(&password);
            Ok(())
        }
        Some(Command::Serve) | None => serve(cli.serve).await,
    }
}

fn hash_password(password: &str) {
    if let Err(problems) = validate_password_strength(password) {
        for problem in problems {
            eprintln!("warning: {problem}");
        }
    }

    println!("{}", platform::password::hash_password(password));
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let access_config = args.access_config()?;
    let catalog_config = args.catalog_config();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let fetcher = HttpMetadataFetcher::new(&catalog_config)?;
    let blobs = FsBlobStore::new(&args.images_dir);

    tracing::info!(
        environment = %args.environment,
        images_dir = %args.images_dir.display(),
        "Starting API server"
    );

    let app = match args.database_url.as_deref() {
        Some(database_url) if !database_url.is_empty() => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let kv = PgKvStore::with_clock(pool.clone(), clock.clone());

            // Startup cleanup: errors here should not prevent server startup
            match kv.cleanup_expired().await {
                Ok(deleted) => {
                    tracing::info!(entries_deleted = deleted, "KV cleanup completed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "KV cleanup failed, continuing anyway");
                }
            }

            let access = AccessAppState::new(
                KvRateLimitRepository::new(kv.clone()),
                access_config,
                clock,
            );
            let catalog = CatalogAppState::<PostgresBackend>::new(
                PgCatalogRepository::new(pool),
                fetcher,
                blobs,
                kv,
                catalog_config,
            );

            build_router(access, catalog, &args.cors_origins())
        }
        _ => {
            tracing::warn!("DATABASE_URL is not set, using in-memory stores");

            let kv = MemoryKvStore::with_clock(clock.clone());
            let access = AccessAppState::new(
                KvRateLimitRepository::new(kv.clone()),
                access_config,
                clock,
            );
            let catalog = CatalogAppState::<InMemoryBackend>::new(
                MemoryCatalogRepository::new(),
                fetcher,
                blobs,
                kv,
                catalog_config,
            );

            build_router(access, catalog, &args.cors_origins())
        }
    };

    // Start server
    tracing::info!("Listening on {}", args.bind_addr);

    let listener = TcpListener::bind(args.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
