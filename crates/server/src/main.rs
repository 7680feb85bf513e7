use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use posterd_core::{
    load_config, validate_config, FileCacheStore, HttpFetcher, PosterCache, PosterResolver,
    ReqwestFetcher,
};
use posterd_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("POSTERD_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Storage root: {:?}", config.storage.root);
    info!("Wikipedia base URL: {}", config.wikipedia.base_url);

    // Poster cache
    let cache_file = config.storage.cache_file();
    let cache: Arc<dyn PosterCache> = Arc::new(FileCacheStore::new(cache_file.clone()));
    cache
        .ensure_initialized()
        .with_context(|| format!("Failed to initialize poster cache at {:?}", cache_file))?;
    info!("Poster cache initialized at {:?}", cache_file);

    // Outbound HTTP
    let fetcher: Arc<dyn HttpFetcher> = Arc::new(
        ReqwestFetcher::new(&config.fetch, &config.wikipedia)
            .context("Failed to create HTTP client")?,
    );

    let resolver = Arc::new(PosterResolver::new(
        Arc::clone(&cache),
        fetcher,
        &config.wikipedia,
        &config.storage,
    ));

    let state = Arc::new(AppState::new(config.clone(), cache, resolver));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
