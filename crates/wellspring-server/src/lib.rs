//! HTTP server wiring for Wellspring.
//!
//! Combines the JSON API from [`wellspring_api`] with a health route and
//! request tracing, and owns the layered server configuration.

use std::path::{Path, PathBuf};

use axum::{Json, Router, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use wellspring_api::{ApiState, ReflectionConfig, api_router};
use wellspring_core::store::WellnessStore;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Environment variable consulted when no API key is configured.
pub const API_KEY_FALLBACK_VAR: &str = "GEMINI_API_KEY";

/// Runtime server configuration, deserialised from `config.toml` and
/// `WELLSPRING_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  pub reflection: ReflectionConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_string(),
      port:       8080,
      store_path: PathBuf::from("~/.local/share/wellspring/wellspring.db"),
      reflection: ReflectionConfig::default(),
    }
  }
}

impl ServerConfig {
  /// Load from the TOML file at `path` (optional) overlaid with the process
  /// environment.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    let mut cfg = Self::load_from(path, None)?;
    if cfg.reflection.api_key.is_none() {
      cfg.reflection.api_key = std::env::var(API_KEY_FALLBACK_VAR).ok();
    }
    Ok(cfg)
  }

  /// As [`Self::load`], reading variables from `env` instead of the process
  /// environment when given. No key fallback is applied.
  pub fn load_from(
    path: &Path,
    env: Option<config::Map<String, String>>,
  ) -> Result<Self, config::ConfigError> {
    let mut cfg: Self = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("WELLSPRING")
          .prefix_separator("_")
          .separator("__")
          .source(env),
      )
      .build()?
      .try_deserialize()?;

    cfg.store_path = expand_tilde(&cfg.store_path);
    if cfg.reflection.api_key.as_deref().is_some_and(str::is_empty) {
      cfg.reflection.api_key = None;
    }
    Ok(cfg)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the top-level router: `/health` plus the API under `/api`.
pub fn router<S>(state: ApiState<S>) -> Router
where
  S: WellnessStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", api_router(state))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }
