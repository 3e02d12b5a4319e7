//! Handlers for `/streak` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/streak/update` | Body: `{"uid","category"}`; 400 if either is missing |
//! | `POST` | `/streak/check` | Read-only; `{"streak": 0}` on any failure |

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};
use wellspring_core::{
  category::{Category, OwnerId},
  store::WellnessStore,
  tracker,
};

use crate::{ApiError, ApiState};

#[derive(Debug, Deserialize)]
pub struct StreakBody {
  #[serde(default, alias = "id")]
  pub uid:      Option<String>,
  #[serde(default)]
  pub category: Option<String>,
}

impl StreakBody {
  fn parse(&self) -> Result<(OwnerId, Category), ApiError> {
    let (Some(uid), Some(category)) = (&self.uid, &self.category) else {
      return Err(ApiError::BadRequest("missing uid or category".into()));
    };
    Ok((OwnerId::parse(uid)?, Category::parse(category)?))
  }
}

/// `POST /streak/update`: counts today towards the streak.
pub async fn update<S>(
  State(state): State<ApiState<S>>,
  payload: Result<Json<StreakBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let (owner, category) = body.parse()?;
  let today = Utc::now().date_naive();

  let streak = tracker::update_streak(&*state.store, &owner, category, today)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(json!({ "streak": streak })))
}

/// `POST /streak/check`: the streak to display. Never writes.
pub async fn check<S>(
  State(state): State<ApiState<S>>,
  payload: Result<Json<StreakBody>, JsonRejection>,
) -> Json<Value>
where
  S: WellnessStore,
{
  let parsed = payload.map_err(ApiError::from).and_then(|Json(body)| body.parse());
  let streak = match parsed {
    Ok((owner, category)) => {
      let today = Utc::now().date_naive();
      tracker::check_streak(&*state.store, &owner, category, today)
        .await
        .unwrap_or_else(|e| {
          tracing::warn!(%owner, %category, "streak check failed: {e}");
          0
        })
    }
    Err(_) => 0,
  };
  Json(json!({ "streak": streak }))
}
