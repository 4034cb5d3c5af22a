//! nr-web - Next Reads HTTP service
//!
//! Startup order:
//! 1. Tracing (default filter until the configuration is known)
//! 2. Configuration: TOML file, then environment, then command line
//! 3. Content store clients, or an in-memory space loaded from a fixture
//! 4. Replay of category intents left by an interrupted run
//! 5. HTTP server with graceful shutdown

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use nr_common::config::TomlConfig;
use nr_common::content::{ContentGateway, ContentSource, DeliveryClient, MemorySpace};
use nr_common::management::{CategoryGateway, EntryStore, FileIntentLog, ManagementClient};
use nr_web::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for nr-web
#[derive(Parser, Debug)]
#[command(name = "nr-web")]
#[command(about = "Next Reads book discovery service")]
#[command(version)]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Interface to bind
    #[arg(long)]
    host: Option<String>,

    /// Serve content from a JSON fixture instead of the hosted store
    #[arg(short, long)]
    fixture: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let (filter, filter_handle) = reload::Layer::new(default_filter("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Next Reads (nr-web) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let mut config = TomlConfig::resolve(args.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(fixture) = args.fixture {
        config.fixture = Some(fixture);
    }

    if let Err(e) = filter_handle.reload(default_filter(&config.logging.level)) {
        warn!("Could not apply log level '{}': {}", config.logging.level, e);
    }

    let (source, store): (Arc<dyn ContentSource>, Arc<dyn EntryStore>) = match &config.fixture {
        Some(path) => {
            info!("Serving content from fixture {}", path.display());
            let space = Arc::new(MemorySpace::load(path).context("Failed to load fixture")?);
            (
                space.clone() as Arc<dyn ContentSource>,
                space as Arc<dyn EntryStore>,
            )
        }
        None => {
            let creds = config
                .content
                .credentials()
                .context("Content store is not configured")?;
            info!(
                space = %creds.space_id,
                environment = %creds.environment,
                "Using hosted content store"
            );
            (
                Arc::new(DeliveryClient::from_credentials(&creds)?) as Arc<dyn ContentSource>,
                Arc::new(ManagementClient::from_credentials(&creds)?) as Arc<dyn EntryStore>,
            )
        }
    };

    let data_folder = config.data_folder();
    let intents = Arc::new(
        FileIntentLog::in_folder(&data_folder).context("Failed to prepare data folder")?,
    );
    info!("Intent log: {}", intents.path().display());

    let categories = CategoryGateway::new(store, intents);
    match categories.recover().await {
        Ok(0) => {}
        Ok(replayed) => info!("Replayed {} interrupted category update(s)", replayed),
        Err(e) => warn!("Intent recovery failed: {}", e),
    }

    let state = AppState::new(ContentGateway::new(source), categories);
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("nr-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// `RUST_LOG` when set, otherwise the configured level
fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(format!("{level},tower_http=info")).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
