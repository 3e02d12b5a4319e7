//! Handler for `POST /dashboard`.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use wellspring_core::{
  store::WellnessStore,
  tracker::{self, Dashboard},
};

use crate::{ApiError, ApiState, OwnerBody, require_owner};

/// `POST /dashboard`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  payload: Result<Json<OwnerBody>, JsonRejection>,
) -> Result<Json<Dashboard>, ApiError>
where
  S: WellnessStore,
{
  let Json(body) = payload?;
  let owner = require_owner(body.uid.as_deref())?;
  let today = Utc::now().date_naive();

  let dashboard = tracker::dashboard(&*state.store, &owner, today)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(dashboard))
}
