//! Async HTTP client wrapping the Wellspring JSON API.

use std::{collections::BTreeMap, time::Duration};

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use wellspring_core::{
  alert::AlertRecord,
  category::Category,
  entry::{Entry, Mood, SortOrder},
  tracker::{AlertEvaluation, Dashboard},
};

/// Connection settings for the Wellspring API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub uid:      String,
}

/// Async HTTP client for the Wellspring JSON API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  /// `body` with the configured `uid` merged in.
  fn owned(&self, mut body: Value) -> Value {
    if let Value::Object(map) = &mut body {
      map.insert("uid".into(), Value::String(self.config.uid.clone()));
    }
    body
  }

  async fn send(&self, path: &str, body: Value) -> Result<reqwest::Response> {
    self
      .client
      .post(self.url(path))
      .json(&body)
      .send()
      .await
      .with_context(|| format!("POST {path} failed"))
  }

  async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
    let resp = self.send(path, body).await?;
    let status = resp.status();
    if !status.is_success() {
      let detail = resp
        .json::<ErrorBody>()
        .await
        .map(|b| b.error)
        .unwrap_or_default();
      return Err(anyhow!("POST {path} → {status}: {detail}"));
    }
    resp
      .json()
      .await
      .with_context(|| format!("deserialising response from {path}"))
  }

  // ── Entries ───────────────────────────────────────────────────────────────

  /// `POST /api/entries/{category}/insert`. `Ok(false)` when an entry for
  /// today already exists.
  pub async fn insert_entry(&self, category: Category, raw: &str) -> Result<bool> {
    let field = match category {
      Category::Mood => "mood",
      Category::Journal | Category::Habit => "writing",
    };
    let path = format!("/entries/{category}/insert");
    let mut body = json!({});
    body[field] = Value::String(raw.to_owned());
    let resp = self.send(&path, self.owned(body)).await?;

    match resp.status() {
      StatusCode::CONFLICT => Ok(false),
      s if s.is_success() => Ok(true),
      s => {
        let detail = resp
          .json::<ErrorBody>()
          .await
          .map(|b| b.error)
          .unwrap_or_default();
        Err(anyhow!("POST {path} → {s}: {detail}"))
      }
    }
  }

  /// `POST /api/entries/{category}/history`
  pub async fn history(
    &self,
    category: Category,
    order: Option<SortOrder>,
  ) -> Result<Vec<Entry>> {
    let mut body = json!({});
    if let Some(order) = order {
      body["order"] = serde_json::to_value(order)?;
    }
    self
      .post(&format!("/entries/{category}/history"), self.owned(body))
      .await
  }

  /// `POST /api/entries/{category}/analyze`
  pub async fn analyze(&self, category: Category, text: &str) -> Result<String> {
    #[derive(Deserialize)]
    struct Analysis {
      analysis: String,
    }
    let resp: Analysis = self
      .post(&format!("/entries/{category}/analyze"), json!({ "text": text }))
      .await?;
    Ok(resp.analysis)
  }

  /// `POST /api/mood/distribution`
  pub async fn distribution(
    &self,
    window: Option<usize>,
  ) -> Result<Option<BTreeMap<Mood, f64>>> {
    #[derive(Deserialize)]
    struct Distribution {
      distribution: Option<BTreeMap<Mood, f64>>,
    }
    let resp: Distribution = self
      .post("/mood/distribution", self.owned(json!({ "window": window })))
      .await?;
    Ok(resp.distribution)
  }

  // ── Streaks ───────────────────────────────────────────────────────────────

  /// `POST /api/streak/check`
  pub async fn streak(&self, category: Category) -> Result<u32> {
    #[derive(Deserialize)]
    struct Streak {
      streak: u32,
    }
    let resp: Streak = self
      .post("/streak/check", self.owned(json!({ "category": category })))
      .await?;
    Ok(resp.streak)
  }

  /// `POST /api/dashboard`
  pub async fn dashboard(&self) -> Result<Dashboard> {
    self.post("/dashboard", self.owned(json!({}))).await
  }

  // ── Alerts ────────────────────────────────────────────────────────────────

  /// `POST /api/alerts/all`
  pub async fn alerts(&self) -> Result<Vec<AlertRecord>> {
    self.post("/alerts/all", self.owned(json!({}))).await
  }

  /// `POST /api/alerts/evaluate`
  pub async fn evaluate(&self) -> Result<AlertEvaluation> {
    self.post("/alerts/evaluate", self.owned(json!({}))).await
  }

  /// `POST /api/alerts/mark-read`
  pub async fn mark_read(&self, created_at: DateTime<Utc>) -> Result<()> {
    let _: Value = self
      .post(
        "/alerts/mark-read",
        self.owned(json!({ "created_at": created_at })),
      )
      .await?;
    Ok(())
  }
}
