//! Handlers for `/alerts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/alerts/insert` | Body: `{"uid","message"}`; a second alert on the same day is absorbed |
//! | `POST` | `/alerts/history` | Body: `{"uid","date":"YYYY-MM-DD"}`; `{"exists": bool}` |
//! | `POST` | `/alerts/all` | Newest first |
//! | `POST` | `/alerts/unread-count` | `{"unread": n}` |
//! | `POST` | `/alerts/mark-read` | Body: `{"uid","created_at"}`; idempotent |
//! | `POST` | `/alerts/evaluate` | Runs the daily missing-entry check |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use wellspring_core::{
  alert::AlertRecord,
  store::WellnessStore,
  tracker::{self, AlertEvaluation},
};

use crate::{ApiError, ApiState, OwnerBody, require_owner};

// ─── Insert ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InsertBody {
  #[serde(default, alias = "id")]
  pub uid:     Option<String>,
  #[serde(default)]
  pub message: Option<String>,
}

/// `POST /alerts/insert`
pub async fn insert<S>(
  State(state): State<ApiState<S>>,
  payload: Result<Json<InsertBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let owner = require_owner(body.uid.as_deref())?;
  let message = body
    .message
    .filter(|m| !m.trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest("missing message".into()))?;

  tracker::insert_alert(&*state.store, &owner, message, Utc::now())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "success": true })))
}

// ─── Exists ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ExistsBody {
  #[serde(default, alias = "id")]
  pub uid:  Option<String>,
  /// Defaults to today (UTC).
  pub date: Option<NaiveDate>,
}

/// `POST /alerts/history`
pub async fn exists<S>(
  State(state): State<ApiState<S>>,
  payload: Result<Json<ExistsBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let owner = require_owner(body.uid.as_deref())?;
  let day = body.date.unwrap_or_else(|| Utc::now().date_naive());

  let exists = state
    .store
    .alert_exists_on(owner, day)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "exists": exists })))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `POST /alerts/all`
pub async fn all<S>(
  State(state): State<ApiState<S>>,
  payload: Result<Json<OwnerBody>, JsonRejection>,
) -> Result<Json<Vec<AlertRecord>>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let owner = require_owner(body.uid.as_deref())?;
  let alerts = state.store.list_alerts(owner).await.map_err(ApiError::store)?;
  Ok(Json(alerts))
}

/// `POST /alerts/unread-count`
pub async fn unread_count<S>(
  State(state): State<ApiState<S>>,
  payload: Result<Json<OwnerBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let owner = require_owner(body.uid.as_deref())?;
  let unread = tracker::unread_count(&*state.store, &owner)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "unread": unread })))
}

// ─── Mark read ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MarkReadBody {
  #[serde(default, alias = "id")]
  pub uid:        Option<String>,
  pub created_at: Option<DateTime<Utc>>,
}

/// `POST /alerts/mark-read`
pub async fn mark_read<S>(
  State(state): State<ApiState<S>>,
  payload: Result<Json<MarkReadBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let owner = require_owner(body.uid.as_deref())?;
  let created_at = body
    .created_at
    .ok_or_else(|| ApiError::BadRequest("missing created_at".into()))?;

  tracker::mark_alert_read(&*state.store, &owner, created_at)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "success": true })))
}

// ─── Evaluate ─────────────────────────────────────────────────────────────────

/// `POST /alerts/evaluate`. Clients call this once per session.
pub async fn evaluate<S>(
  State(state): State<ApiState<S>>,
  payload: Result<Json<OwnerBody>, JsonRejection>,
) -> Result<Json<AlertEvaluation>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let owner = require_owner(body.uid.as_deref())?;
  let outcome = tracker::evaluate_today(&*state.store, &owner, Utc::now())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(outcome))
}
