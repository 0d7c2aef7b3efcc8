//! Resize Streamer - on-demand image resizing from object storage.
//!
//! This binary starts the HTTP server and configures all components.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resize_streamer::{
    cache::CacheStore,
    config::{Config, Settings},
    create_s3_client,
    io::S3ObjectStore,
    resolve::DescriptorResolver,
    server::{create_router, RouterConfig},
    service::ResizeService,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    let settings = match config.load() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    run_serve(settings).await
}

async fn run_serve(settings: Settings) -> ExitCode {
    info!("Resize Streamer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    if let Some(ref endpoint) = settings.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", settings.s3_region);
    info!(
        "  Catalog: {} bucket alias(es), {} assortment(s)",
        settings.catalog.buckets.len(),
        settings.catalog.assortments.len()
    );
    info!(
        "  Cache: {} (max {} files)",
        settings.cache_dir.display(),
        settings.max_cache_files
    );
    info!("  JPEG quality: {}", settings.jpeg_quality);

    let cache = match CacheStore::open(&settings.cache_dir, settings.max_cache_files).await {
        Ok(cache) => cache,
        Err(e) => {
            error!(
                "Failed to open cache directory {}: {}",
                settings.cache_dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    };
    info!("  Cache entries on disk: {}", cache.len().await);

    let s3_client = create_s3_client(settings.s3_endpoint.as_deref(), &settings.s3_region).await;
    let store = S3ObjectStore::new(s3_client);

    let resolver = DescriptorResolver::new(Arc::new(settings.catalog.clone()));
    let service =
        ResizeService::new(resolver, store, cache).with_jpeg_quality(settings.jpeg_quality);

    let router = create_router(service, build_router_config(&settings));

    let addr = settings.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl http://{}/<alias>/<assortment>/<object_key>/<size>.jpg",
        addr
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "resize_streamer=debug,tower_http=debug"
    } else {
        "resize_streamer=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the merged settings.
fn build_router_config(settings: &Settings) -> RouterConfig {
    let mut router_config = RouterConfig::new().with_cache_max_age(settings.cache_max_age);

    if let Some(ref origins) = settings.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config.with_tracing(!settings.no_tracing)
}
