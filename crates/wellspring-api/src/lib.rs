//! JSON API for Wellspring.
//!
//! Exposes an axum [`Router`] backed by any
//! [`wellspring_core::store::WellnessStore`]. Every route is a `POST` with a
//! JSON body carrying the owner identifier as `uid` (or `id`). Identity
//! verification, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", wellspring_api::api_router(state))
//! ```

pub mod alerts;
pub mod dashboard;
pub mod entries;
pub mod error;
pub mod reflection;
pub mod streaks;

use std::sync::Arc;

use axum::{Router, routing::post};
use serde::Deserialize;
use wellspring_core::{category::OwnerId, store::WellnessStore};

pub use error::ApiError;
pub use reflection::{ReflectionClient, ReflectionConfig};

/// Shared state threaded through all API handlers.
#[derive(Clone)]
pub struct ApiState<S> {
  pub store:     Arc<S>,
  pub reflector: Arc<ReflectionClient>,
}

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: WellnessStore + Clone + Send + Sync + 'static,
{
  Router::new()
    // Entries
    .route("/entries/{category}/insert", post(entries::insert::<S>))
    .route("/entries/{category}/check-today", post(entries::check_today::<S>))
    .route("/entries/{category}/history", post(entries::history::<S>))
    .route("/entries/{category}/analyze", post(entries::analyze::<S>))
    .route("/mood/distribution", post(entries::distribution::<S>))
    // Streaks
    .route("/streak/update", post(streaks::update::<S>))
    .route("/streak/check", post(streaks::check::<S>))
    // Alerts
    .route("/alerts/insert", post(alerts::insert::<S>))
    .route("/alerts/history", post(alerts::exists::<S>))
    .route("/alerts/all", post(alerts::all::<S>))
    .route("/alerts/unread-count", post(alerts::unread_count::<S>))
    .route("/alerts/mark-read", post(alerts::mark_read::<S>))
    .route("/alerts/evaluate", post(alerts::evaluate::<S>))
    // Dashboard
    .route("/dashboard", post(dashboard::handler::<S>))
    .with_state(state)
}

/// The smallest body every route accepts: just the owner.
#[derive(Debug, Deserialize)]
pub struct OwnerBody {
  #[serde(default, alias = "id")]
  pub uid: Option<String>,
}

/// Validate an optional raw owner field from a request body.
pub(crate) fn require_owner(raw: Option<&str>) -> Result<OwnerId, ApiError> {
  let raw = raw.ok_or_else(|| ApiError::BadRequest("missing uid".into()))?;
  Ok(OwnerId::parse(raw)?)
}

#[cfg(test)]
mod tests;
