//! HTTP tests driving [`api_router`] against an in-memory SQLite store.

use std::sync::{Arc, Mutex};

use axum::{
  Json, Router,
  body::Body,
  extract::Query,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower::ServiceExt as _;
use wellspring_store_sqlite::SqliteStore;

use super::*;
use crate::reflection::PLACEHOLDER;

async fn make_state_with(reflection: ReflectionConfig) -> ApiState<SqliteStore> {
  let store = SqliteStore::open_in_memory().await.unwrap();
  ApiState {
    store:     Arc::new(store),
    reflector: Arc::new(ReflectionClient::new(reflection).unwrap()),
  }
}

async fn make_state() -> ApiState<SqliteStore> {
  make_state_with(ReflectionConfig::default()).await
}

async fn post(state: &ApiState<SqliteStore>, uri: &str, body: Value) -> (StatusCode, Value) {
  post_raw(state, uri, body.to_string()).await
}

async fn post_raw(
  state: &ApiState<SqliteStore>,
  uri: &str,
  body: String,
) -> (StatusCode, Value) {
  let req = Request::builder()
    .method("POST")
    .uri(uri)
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body))
    .unwrap();
  let resp = api_router(state.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
  };
  (status, value)
}

/// Serve a canned model response on an ephemeral port, recording the last
/// request body and `key` query parameter.
async fn mock_model(reply: Value) -> (String, Arc<Mutex<Option<(String, Value)>>>) {
  let seen = Arc::new(Mutex::new(None));
  let captured = seen.clone();
  let app = Router::new().fallback(
    move |Query(q): Query<std::collections::HashMap<String, String>>,
          Json(body): Json<Value>| {
      let reply = reply.clone();
      let captured = captured.clone();
      async move {
        let key = q.get("key").cloned().unwrap_or_default();
        *captured.lock().unwrap() = Some((key, body));
        Json(reply)
      }
    },
  );
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move {
    axum::serve(listener, app).await.unwrap();
  });
  (format!("http://{addr}"), seen)
}

// ── Entries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_journal_then_duplicate_is_409() {
  let state = make_state().await;

  let (status, body) = post(
    &state,
    "/entries/journal/insert",
    json!({ "id": "u1", "writing": "A calm day." }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "message": "Saved" }));

  let (status, _) = post(
    &state,
    "/entries/journal/insert",
    json!({ "id": "u1", "writing": "Second try." }),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (_, history) = post(&state, "/entries/journal/history", json!({ "uid": "u1" })).await;
  assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn insert_updates_streak_and_check_today() {
  let state = make_state().await;

  let (_, before) = post(&state, "/entries/mood/check-today", json!({ "uid": "u1" })).await;
  assert_eq!(before, json!({ "submitted": false }));

  let (status, _) = post(
    &state,
    "/entries/mood/insert",
    json!({ "uid": "u1", "mood_": "happy" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (_, after) = post(&state, "/entries/mood/check-today", json!({ "uid": "u1" })).await;
  assert_eq!(after, json!({ "submitted": true }));

  let (_, streak) = post(
    &state,
    "/streak/check",
    json!({ "uid": "u1", "category": "mood" }),
  )
  .await;
  assert_eq!(streak, json!({ "streak": 1 }));
}

#[tokio::test]
async fn insert_validates_fields() {
  let state = make_state().await;

  let cases = [
    ("/entries/mood/insert", json!({ "mood": "happy" })),
    ("/entries/mood/insert", json!({ "uid": "u1" })),
    ("/entries/mood/insert", json!({ "uid": "u1", "mood": "grumpy" })),
    ("/entries/journal/insert", json!({ "uid": "  ", "writing": "x" })),
    ("/entries/journal/insert", json!({ "uid": "u1", "writing": "" })),
    ("/entries/habits/insert", json!({ "uid": "u1", "writing": "walk" })),
    ("/entries/sleep/insert", json!({ "uid": "u1", "writing": "8h" })),
  ];
  for (uri, body) in cases {
    let (status, resp) = post(&state, uri, body.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} {body}");
    assert!(resp.get("error").is_some(), "{uri} {body}");
  }
}

#[tokio::test]
async fn habits_alias_routes_to_habit() {
  let state = make_state().await;
  let (status, _) = post(
    &state,
    "/entries/habits/insert",
    json!({ "id": "u1", "writing": "walk = yes, read = no" }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (_, history) = post(&state, "/entries/habit/history", json!({ "id": "u1" })).await;
  let rows = history.as_array().unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["value"]["type"], "habit");
  assert_eq!(rows[0]["value"]["data"], "walk = yes, read = no");
}

#[tokio::test]
async fn mood_distribution_reports_null_without_history() {
  let state = make_state().await;
  let (_, empty) = post(&state, "/mood/distribution", json!({ "uid": "u1" })).await;
  assert_eq!(empty, json!({ "distribution": null }));

  post(&state, "/entries/mood/insert", json!({ "uid": "u1", "mood": "sad" })).await;
  let (_, one) = post(&state, "/mood/distribution", json!({ "uid": "u1" })).await;
  assert_eq!(one, json!({ "distribution": { "sad": 100.0 } }));

  let (_, window) = post(
    &state,
    "/mood/distribution",
    json!({ "uid": "u1", "window": 7 }),
  )
  .await;
  assert_eq!(window, json!({ "distribution": null }));
}

// ── Streaks ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn streak_update_requires_fields() {
  let state = make_state().await;

  let (status, _) = post(&state, "/streak/update", json!({ "uid": "u1" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, _) = post(
    &state,
    "/streak/update",
    json!({ "uid": "u1", "category": "sleep" }),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn streak_update_is_idempotent_within_a_day() {
  let state = make_state().await;
  let body = json!({ "uid": "u1", "category": "journal" });

  let (status, first) = post(&state, "/streak/update", body.clone()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(first, json!({ "streak": 1 }));

  let (_, second) = post(&state, "/streak/update", body).await;
  assert_eq!(second, json!({ "streak": 1 }));
}

#[tokio::test]
async fn streak_check_reports_zero_on_bad_input() {
  let state = make_state().await;
  for body in [
    json!({}),
    json!({ "uid": "u1" }),
    json!({ "uid": "u1", "category": "nope" }),
    json!({ "uid": "u1", "category": "mood" }),
    json!({ "uid": "u1", "category": 5 }),
    json!({ "uid": 42, "category": "mood" }),
  ] {
    let (status, resp) = post(&state, "/streak/check", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp, json!({ "streak": 0 }));
  }

  let (status, resp) = post_raw(&state, "/streak/check", "not json".into()).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(resp, json!({ "streak": 0 }));
}

#[tokio::test]
async fn wrongly_typed_bodies_are_400_with_json_error() {
  let state = make_state().await;

  let cases = [
    ("/streak/update", json!({ "uid": 42, "category": "mood" })),
    ("/streak/update", json!({ "uid": "u1", "category": 5 })),
    ("/alerts/mark-read", json!({ "uid": "u1", "created_at": "yesterday" })),
    ("/alerts/history", json!({ "uid": "u1", "date": "05/01/2025" })),
    ("/entries/mood/history", json!({ "uid": "u1", "order": "sideways" })),
    ("/mood/distribution", json!({ "uid": "u1", "window": -1 })),
    ("/dashboard", json!({ "uid": ["u1"] })),
  ];
  for (uri, body) in cases {
    let (status, resp) = post(&state, uri, body.clone()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{uri} {body}");
    assert!(resp["error"].is_string(), "{uri} {body} -> {resp}");
  }

  let (status, resp) =
    post_raw(&state, "/entries/journal/insert", "{\"uid\": ".into()).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(resp["error"].is_string());
}

// ── Alerts ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn alert_insert_twice_succeeds_once_stored() {
  let state = make_state().await;
  for msg in ["first", "second"] {
    let (status, body) = post(
      &state,
      "/alerts/insert",
      json!({ "id": "u1", "message": msg }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
  }

  let (_, all) = post(&state, "/alerts/all", json!({ "id": "u1" })).await;
  let all = all.as_array().unwrap();
  assert_eq!(all.len(), 1);
  assert_eq!(all[0]["message"], "first");
  assert_eq!(all[0]["status"], "unread");

  let (_, exists) = post(&state, "/alerts/history", json!({ "id": "u1" })).await;
  assert_eq!(exists, json!({ "exists": true }));

  let (_, other_day) = post(
    &state,
    "/alerts/history",
    json!({ "id": "u1", "date": "2001-01-01" }),
  )
  .await;
  assert_eq!(other_day, json!({ "exists": false }));
}

#[tokio::test]
async fn evaluate_then_mark_read() {
  let state = make_state().await;
  post(&state, "/entries/mood/insert", json!({ "uid": "u1", "mood": "happy" })).await;
  post(
    &state,
    "/entries/habit/insert",
    json!({ "uid": "u1", "writing": "walk = yes" }),
  )
  .await;

  let (status, outcome) = post(&state, "/alerts/evaluate", json!({ "uid": "u1" })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(outcome["outcome"], "alerted");
  assert_eq!(
    outcome["alert"]["message"],
    "Alert! You have not entered your journal for today"
  );

  let (_, again) = post(&state, "/alerts/evaluate", json!({ "uid": "u1" })).await;
  assert_eq!(again, json!({ "outcome": "already_alerted" }));

  let (_, count) = post(&state, "/alerts/unread-count", json!({ "uid": "u1" })).await;
  assert_eq!(count, json!({ "unread": 1 }));

  let created_at = outcome["alert"]["created_at"].clone();
  for _ in 0..2 {
    let (status, body) = post(
      &state,
      "/alerts/mark-read",
      json!({ "id": "u1", "created_at": created_at }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));
  }

  let (_, count) = post(&state, "/alerts/unread-count", json!({ "uid": "u1" })).await;
  assert_eq!(count, json!({ "unread": 0 }));
}

#[tokio::test]
async fn mark_read_requires_timestamp() {
  let state = make_state().await;
  let (status, _) = post(&state, "/alerts/mark-read", json!({ "uid": "u1" })).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Dashboard ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_reflects_todays_entries() {
  let state = make_state().await;
  post(&state, "/entries/mood/insert", json!({ "uid": "u1", "mood": "playful" })).await;
  post(
    &state,
    "/entries/journal/insert",
    json!({ "uid": "u1", "writing": "Good." }),
  )
  .await;

  let (status, dash) = post(&state, "/dashboard", json!({ "uid": "u1" })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(dash["last_mood"], "playful");
  assert_eq!(dash["journal_today"], true);
  assert_eq!(dash["habits_today"], Value::Null);
  assert_eq!(dash["streaks"], json!({ "mood": 1, "journal": 1, "habit": 0 }));
}

// ── Reflection ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn analyze_relays_model_text() {
  let (endpoint, seen) = mock_model(json!({
    "candidates": [{ "content": { "parts": [{ "text": "A steady, hopeful day." }] } }]
  }))
  .await;
  let state = make_state_with(ReflectionConfig {
    endpoint,
    api_key: Some("test-key".into()),
    ..ReflectionConfig::default()
  })
  .await;

  let (status, body) = post(
    &state,
    "/entries/journal/analyze",
    json!({ "text": "Walked by the river." }),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "analysis": "A steady, hopeful day." }));

  let (key, sent) = seen.lock().unwrap().clone().unwrap();
  assert_eq!(key, "test-key");
  let prompt = sent["contents"][0]["parts"][0]["text"].as_str().unwrap();
  assert!(prompt.contains("daily journals"));
  assert!(prompt.ends_with("Walked by the river."));
}

#[tokio::test]
async fn analyze_falls_back_when_model_has_no_text() {
  let (endpoint, _) = mock_model(json!({ "candidates": [] })).await;
  let state = make_state_with(ReflectionConfig {
    endpoint,
    api_key: Some("k".into()),
    ..ReflectionConfig::default()
  })
  .await;

  let (_, body) = post(&state, "/entries/mood/analyze", json!({ "text": "happy sad" })).await;
  assert_eq!(body, json!({ "analysis": PLACEHOLDER }));
}

#[tokio::test]
async fn analyze_falls_back_when_model_is_unreachable() {
  let state = make_state_with(ReflectionConfig {
    endpoint: "http://127.0.0.1:1".into(),
    api_key: Some("k".into()),
    timeout_secs: 5,
    ..ReflectionConfig::default()
  })
  .await;

  let (status, body) = post(&state, "/entries/habit/analyze", json!({ "text": "walk = no" })).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!({ "analysis": PLACEHOLDER }));
}

#[tokio::test]
async fn analyze_requires_text() {
  let state = make_state().await;
  let (status, _) = post(&state, "/entries/journal/analyze", json!({})).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}
