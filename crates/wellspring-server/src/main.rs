//! wellspring-server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`) overlaid with
//! `WELLSPRING_*` environment variables, opens the SQLite store, and serves
//! the JSON API over HTTP.
//!
//! ```
//! WELLSPRING_REFLECTION__API_KEY=... cargo run -p wellspring-server
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use wellspring_api::{ApiState, ReflectionClient};
use wellspring_server::ServerConfig;
use wellspring_store_sqlite::SqliteStore;

#[derive(Parser)]
#[command(author, version, about = "Wellspring wellness tracker server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  if server_cfg.reflection.api_key.is_none() {
    tracing::warn!("no reflection API key configured; analysis will be unavailable");
  }

  if let Some(parent) = server_cfg.store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }

  let store = SqliteStore::open(&server_cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", server_cfg.store_path))?;

  let reflector = ReflectionClient::new(server_cfg.reflection.clone())
    .context("failed to build reflection client")?;

  let state = ApiState {
    store:     Arc::new(store),
    reflector: Arc::new(reflector),
  };

  let app = wellspring_server::router(state);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
