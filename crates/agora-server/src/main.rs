//! agora-server binary.
//!
//! Reads `agora.toml` (or the path given with `--config`), builds an
//! in-memory forum store, and serves the JSON API over HTTP on a fixed-size
//! pool of worker threads.
//!
//! ```
//! cargo run -p agora-server -- --port 50051 --workers 10
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use agora_api::{AppState, BroadcastSink};
use agora_core::vote::ScoreEvent;
use agora_store_memory::MemoryStore;
use anyhow::Context as _;
use clap::Parser;
use tokio::{
  net::TcpListener,
  sync::broadcast::{self, error::RecvError},
};
use tower_http::trace::TraceLayer;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::ServerConfig;

#[derive(Parser)]
#[command(author, version, about = "Agora forum server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "agora.toml")]
  config: PathBuf,

  /// Address to bind; overrides the config file.
  #[arg(long)]
  host: Option<String>,

  /// Port to listen on; overrides the config file.
  #[arg(short, long)]
  port: Option<u16>,

  /// Number of request worker threads; overrides the config file.
  #[arg(short, long)]
  workers: Option<usize>,
}

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;
  if let Some(host) = cli.host {
    cfg.host = host;
  }
  if let Some(port) = cli.port {
    cfg.port = port;
  }
  if let Some(workers) = cli.workers {
    cfg.workers = workers;
  }

  let runtime = tokio::runtime::Builder::new_multi_thread()
    .worker_threads(cfg.workers.max(1))
    .enable_all()
    .build()
    .context("failed to start tokio runtime")?;

  runtime.block_on(serve(cfg))
}

async fn serve(cfg: ServerConfig) -> anyhow::Result<()> {
  let feed = BroadcastSink::new(cfg.feed_capacity);
  tokio::spawn(log_scores(feed.subscribe()));

  let store = Arc::new(MemoryStore::with_sink(Arc::new(feed)));
  let app = agora_api::api_router(AppState::new(store, cfg.branch))
    .layer(TraceLayer::new_for_http());

  let address = cfg.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  tracing::info!(workers = cfg.workers, "Listening on http://{address}");

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

/// Log every score change. Stands in for the live feed's delivery side.
async fn log_scores(mut rx: broadcast::Receiver<ScoreEvent>) {
  loop {
    match rx.recv().await {
      Ok(event) => {
        tracing::debug!(entity = %event.target, score = event.score, "score changed");
      }
      Err(RecvError::Lagged(skipped)) => {
        tracing::warn!(skipped, "score feed subscriber lagged");
      }
      Err(RecvError::Closed) => break,
    }
  }
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("failed to listen for ctrl-c: {e}");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutdown requested");
}
