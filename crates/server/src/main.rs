mod api;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use prometheus::Registry;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use darkroom_core::{
    load_config, metrics, validate_config, FsBlobStore, GalleryStore, ImagenEditor,
    JobOrchestrator, JobPoller, JobStore, OrchestratorConfig, PollerConfig, SqliteDocumentStore,
};

use api::create_router;
use state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {}", e);
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
    let config_path = std::env::var("DARKROOM_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("Storage root: {:?}", config.storage.root);

    // Document store and record facades
    let documents = Arc::new(
        SqliteDocumentStore::new(&config.database.path)
            .context("Failed to create document store")?,
    );
    let jobs = JobStore::new(Arc::clone(&documents) as Arc<dyn darkroom_core::DocumentStore>);
    let galleries =
        GalleryStore::new(Arc::clone(&documents) as Arc<dyn darkroom_core::DocumentStore>);
    info!("Document store initialized");

    // Object storage
    let blobs: Arc<dyn darkroom_core::BlobStore> =
        Arc::new(FsBlobStore::new(config.storage.root.clone()));

    // Remote editing service client
    if config.editor.api_key.is_empty() {
        warn!("No editing credential configured; jobs will fail at orchestration time");
    }
    let editor: Arc<dyn darkroom_core::PhotoEditor> =
        Arc::new(ImagenEditor::new(config.editor.clone()));
    info!("Editing service client initialized ({})", editor.name());

    // Pipeline components
    let orchestrator = Arc::new(JobOrchestrator::new(
        OrchestratorConfig::from_config(&config),
        jobs.clone(),
        Arc::clone(&editor),
        Arc::clone(&blobs),
    ));
    let poller = Arc::new(JobPoller::new(
        PollerConfig {
            scan_max_pages: config.pipeline.scan_max_pages,
        },
        jobs.clone(),
        galleries,
        Arc::clone(&editor),
        Arc::clone(&blobs),
    ));

    // Metrics registry
    let registry = Registry::new();
    metrics::register_all(&registry).context("Failed to register metrics")?;

    // Poll schedule
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    spawn_poll_loop(
        Arc::clone(&poller),
        config.pipeline.poll_interval_secs,
        shutdown_tx.subscribe(),
    );

    // HTTP server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let app_state = Arc::new(AppState::new(
        config,
        jobs,
        orchestrator,
        poller,
        registry,
    ));
    let router = create_router(app_state);

    info!("darkroom {} listening on {}", VERSION, addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    // Stop the poll loop
    let _ = shutdown_tx.send(());
    info!("Shutdown complete");
    Ok(())
}

/// Spawn the fixed-interval poll loop.
fn spawn_poll_loop(
    poller: Arc<JobPoller>,
    interval_secs: u64,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    tokio::spawn(async move {
        info!("Poll loop started (every {}s)", interval_secs);
        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Poll loop received shutdown signal");
                    break;
                }
                _ = tokio::time::sleep(Duration::from_secs(interval_secs)) => {
                    poller.run_once().await;
                }
            }
        }
        info!("Poll loop stopped");
    });
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }
}
