//! Handlers for `/entries/{category}/...` and `/mood/distribution`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/entries/{category}/insert` | Body: `{"uid", "mood" \| "writing"}`; 409 if already submitted today |
//! | `POST` | `/entries/{category}/check-today` | `{"submitted": bool}` |
//! | `POST` | `/entries/{category}/history` | Optional `"order": "asc" \| "desc"` |
//! | `POST` | `/entries/{category}/analyze` | Body: `{"text"}`; `{"analysis": ...}` |
//! | `POST` | `/mood/distribution` | Optional `"window"`; `{"distribution": {...} \| null}` |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use wellspring_core::{
  category::Category,
  entry::{Entry, EntryValue, NewEntry, SortOrder, mood_distribution},
  store::{InsertOutcome, WellnessStore},
  tracker,
};

use crate::{ApiError, ApiState, OwnerBody, require_owner};

// ─── Insert ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InsertBody {
  #[serde(default, alias = "id")]
  pub uid:     Option<String>,
  /// Mood word; only read for the `mood` category.
  #[serde(default, alias = "mood_")]
  pub mood:    Option<String>,
  /// Journal text or habit checklist.
  #[serde(default)]
  pub writing: Option<String>,
}

/// `POST /entries/{category}/insert`
pub async fn insert<S>(
  State(state): State<ApiState<S>>,
  Path(category): Path<String>,
  payload: Result<Json<InsertBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let category = Category::parse(&category)?;
  let owner = require_owner(body.uid.as_deref())?;
  let (field, raw) = match category {
    Category::Mood => ("mood", body.mood),
    Category::Journal | Category::Habit => ("writing", body.writing),
  };
  let raw = raw.ok_or_else(|| ApiError::BadRequest(format!("missing {field}")))?;
  let value = EntryValue::from_text(category, &raw)?;

  let entry = NewEntry { owner, value, created_at: Utc::now() };
  match tracker::record_entry(&*state.store, entry)
    .await
    .map_err(ApiError::store)?
  {
    InsertOutcome::Inserted(_) => Ok(Json(json!({ "message": "Saved" }))),
    InsertOutcome::Duplicate => Err(ApiError::Conflict("Already submitted".into())),
  }
}

// ─── Check today ──────────────────────────────────────────────────────────────

/// `POST /entries/{category}/check-today`
pub async fn check_today<S>(
  State(state): State<ApiState<S>>,
  Path(category): Path<String>,
  payload: Result<Json<OwnerBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let category = Category::parse(&category)?;
  let owner = require_owner(body.uid.as_deref())?;
  let today = Utc::now().date_naive();

  let submitted = state
    .store
    .entry_exists_on(owner, category, today)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "submitted": submitted })))
}

// ─── History ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct HistoryBody {
  #[serde(default, alias = "id")]
  pub uid:   Option<String>,
  /// Defaults to oldest-first for mood and newest-first otherwise.
  pub order: Option<SortOrder>,
}

/// `POST /entries/{category}/history`
pub async fn history<S>(
  State(state): State<ApiState<S>>,
  Path(category): Path<String>,
  payload: Result<Json<HistoryBody>, JsonRejection>,
) -> Result<Json<Vec<Entry>>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let category = Category::parse(&category)?;
  let owner = require_owner(body.uid.as_deref())?;
  let order = body.order.unwrap_or_else(|| SortOrder::default_for(category));

  let entries = state
    .store
    .list_entries(owner, category, order)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entries))
}

// ─── Analyze ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeBody {
  #[serde(default)]
  pub text: Option<String>,
}

/// `POST /entries/{category}/analyze`. Never fails on model errors; the
/// placeholder text is returned instead.
pub async fn analyze<S>(
  State(state): State<ApiState<S>>,
  Path(category): Path<String>,
  payload: Result<Json<AnalyzeBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let category = Category::parse(&category)?;
  let text = body
    .text
    .filter(|t| !t.trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest("missing text".into()))?;

  let analysis = state.reflector.reflect(category, &text).await;
  Ok(Json(json!({ "analysis": analysis })))
}

// ─── Mood distribution ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DistributionBody {
  #[serde(default, alias = "id")]
  pub uid:    Option<String>,
  /// Number of most recent moods to include; all when absent.
  pub window: Option<usize>,
}

/// `POST /mood/distribution`
pub async fn distribution<S>(
  State(state): State<ApiState<S>>,
  payload: Result<Json<DistributionBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let owner = require_owner(body.uid.as_deref())?;
  let moods = state
    .store
    .list_entries(owner, Category::Mood, SortOrder::Asc)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(json!({ "distribution": mood_distribution(&moods, body.window) })))
}
