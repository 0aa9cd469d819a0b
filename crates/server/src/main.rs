mod api;
mod metrics;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelink_core::{
    load_config, validate_config, ExternalCatalog, FsLinker, JsonStateStore, Linker, MountRemap,
    NameResolver, Organiser, SanitizedConfig, StateStore, TmdbClient,
};

use api::create_router;
use state::AppState;

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
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path; without REELINK_CONFIG the default file is optional
    let config_path = std::env::var("REELINK_CONFIG").ok().map(PathBuf::from);

    match &config_path {
        Some(path) => info!("Loading configuration from {:?}", path),
        None => info!("Loading configuration from defaults and environment"),
    }
    let config = load_config(config_path.as_deref())
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!(
        "Effective configuration: {}",
        serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default()
    );

    // Metadata verification is optional
    let catalog: Option<Arc<dyn ExternalCatalog>> = if config.tmdb.is_enabled() {
        info!("Initializing TMDB client");
        match TmdbClient::new(config.tmdb.clone()) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                error!("Failed to create TMDB client, titles will not be verified: {}", e);
                None
            }
        }
    } else {
        info!("TMDB not configured, using parsed titles as-is");
        None
    };

    let remap = MountRemap::new(
        config.library.source_mount.clone(),
        config.library.consumer_mount.clone(),
    );
    if !remap.is_identity() {
        info!(
            "Links will point into {:?} instead of {:?}",
            config.library.consumer_mount, config.library.source_mount
        );
    }
    let linker: Arc<dyn Linker> = Arc::new(FsLinker::new(remap));
    let state_store: Arc<dyn StateStore> = Arc::new(JsonStateStore::new(&config.state.path));
    info!("State file: {:?}", config.state.path);

    let organiser = Arc::new(Organiser::new(
        &config,
        NameResolver::with_catalog(catalog),
        linker,
        state_store,
    ));

    organiser.start().await;
    info!("Organiser started");

    if config.server.enabled {
        let state = Arc::new(AppState::new(config.clone(), Arc::clone(&organiser)));
        let app = create_router(state);

        let addr = SocketAddr::new(config.server.host, config.server.port);
        info!("Starting server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;
    } else {
        info!("HTTP server disabled in config");
        shutdown_signal().await;
    }

    info!("Stopping organiser...");
    organiser.stop().await;
    info!("Organiser stopped");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
