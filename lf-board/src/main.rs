//! lf-board - Lost & Found listing board
//!
//! Serves the public board and the admin review page from one process.
//! The backing store (published spreadsheet or local document store) is
//! chosen by configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use lf_common::config::{ConfigResolver, SourceKind, TomlConfig};
use lf_common::events::EventBus;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lf_board::board::{Board, ReloadTrigger};
use lf_board::source::{DocumentStore, ItemSource, SheetSource};
use lf_board::{build_router, AppState};

/// Command-line arguments for lf-board
#[derive(Parser, Debug)]
#[command(name = "lf-board")]
#[command(about = "Lost & Found listing board")]
#[command(version)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "LOSTFOUND_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (overrides config)
    #[arg(long, env = "LOSTFOUND_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "LOSTFOUND_PORT")]
    port: Option<u16>,

    /// Backing store: "sheet" or "store" (overrides config)
    #[arg(long)]
    source: Option<SourceKind>,

    /// Published CSV export URL (overrides config)
    #[arg(long, env = "LOSTFOUND_SHEET_URL")]
    sheet_url: Option<String>,
}

impl Args {
    fn apply(self, config: &mut TomlConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(kind) = self.source {
            config.source.kind = kind;
        }
        if let Some(url) = self.sheet_url {
            config.source.sheet_url = Some(url);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = ConfigResolver::new(args.config.clone()).resolve();
    let mut config = TomlConfig::load_or_default(config_path.as_deref());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("lf_board={0},lf_common={0},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting Lost & Found board (lf-board) v{}",
        env!("CARGO_PKG_VERSION")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file, using compiled defaults"),
    }

    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    let events = EventBus::default();

    let (source, store): (Arc<dyn ItemSource>, Option<DocumentStore>) = match config.source.kind {
        SourceKind::Sheet => {
            let url = config.source.sheet_url.clone().unwrap_or_default();
            info!("Backing store: published sheet {}", url);
            let sheet = SheetSource::new(
                url,
                config.columns.clone(),
                Duration::from_secs(config.source.fetch_timeout_secs),
            )
            .context("Failed to create HTTP client")?;
            (Arc::new(sheet), None)
        }
        SourceKind::Store => {
            let db_path = config.store.database_path();
            info!("Backing store: document store at {}", db_path.display());
            let store = DocumentStore::open(&db_path, events.clone())
                .await
                .context("Failed to open document store")?;
            (Arc::new(store.clone()), Some(store))
        }
    };

    let board = Arc::new(Board::new(source, events.clone()));

    // A failed first load leaves the board in LoadError; the next
    // refresh or timer tick retries
    if let Err(e) = board.reload(ReloadTrigger::Startup).await {
        warn!("Initial load failed: {}", e);
    }

    let _refresh = Arc::clone(&board)
        .spawn_refresh_task(Duration::from_secs(config.source.poll_interval_secs));

    if config.admin.token.is_none() && store.is_some() {
        info!("Admin review open without a token (admin.token not set)");
    }

    let mut state = AppState::new(board, events).with_admin_token(config.admin.token.clone());
    if let Some(store) = store {
        state = state.with_store(store);
    }
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("lf-board listening on http://{}", addr);
    info!("Admin review: http://{}/admin", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
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
            Ok(mut sig) => {
                sig.recv().await;
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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
