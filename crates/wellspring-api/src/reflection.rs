//! Client for the generative-language endpoint that writes short reflections
//! on a user's entries.
//!
//! Reflection is best-effort: every failure is logged and replaced by
//! [`PLACEHOLDER`]. Each call is attempted once.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;
use wellspring_core::category::Category;

/// Returned whenever the model produced no usable text.
pub const PLACEHOLDER: &str = "No analysis available.";

// ─── Configuration ────────────────────────────────────────────────────────────

/// Connection settings for the model endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReflectionConfig {
  /// Base URL, without the `/v1beta/...` path.
  pub endpoint:     String,
  pub model:        String,
  /// Reflection is disabled (placeholder only) while this is unset.
  pub api_key:      Option<String>,
  pub timeout_secs: u64,
}

impl Default for ReflectionConfig {
  fn default() -> Self {
    Self {
      endpoint:     "https://generativelanguage.googleapis.com".to_string(),
      model:        "gemini-2.5-flash".to_string(),
      api_key:      None,
      timeout_secs: 30,
    }
  }
}

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
  text: Option<String>,
}

impl GenerateResponse {
  /// `candidates[0].content.parts[0].text`, if non-blank.
  fn into_text(self) -> Option<String> {
    self
      .candidates
      .into_iter()
      .next()?
      .content?
      .parts
      .into_iter()
      .next()?
      .text
      .filter(|t| !t.trim().is_empty())
  }
}

#[derive(Debug, Error)]
enum ReflectionError {
  #[error("no API key configured")]
  MissingApiKey,

  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("model endpoint returned {0}")]
  Status(StatusCode),

  #[error("response contained no text")]
  NoText,
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ReflectionClient {
  client: Client,
  config: ReflectionConfig,
}

impl ReflectionClient {
  pub fn new(config: ReflectionConfig) -> Result<Self, reqwest::Error> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  /// The instruction sent ahead of the user's text.
  pub fn prompt(category: Category, text: &str) -> String {
    let instruction = match category {
      Category::Journal => {
        "This is one of the daily journals of a mental health tracker web app \
         user. Analyze how their day went emotionally and mentally in 4 to 5 \
         sentences:"
      }
      Category::Mood => {
        "Each word below represents a user's mood at a specific moment (e.g., \
         \"happy sad angry excited\"). Analyze the pattern of moods, identify \
         the most common mood, and suggest one mood that supports long-term \
         mental health. Give your analysis and suggestions in 3-5 sentences:"
      }
      Category::Habit => {
        "The following is a daily activities tracking entry from a mental \
         health app user. Analyze their activities and suggest improvements \
         in 3-5 sentences:"
      }
    };
    format!("{instruction}\n\n{text}")
  }

  fn url(&self) -> String {
    format!(
      "{}/v1beta/models/{}:generateContent",
      self.config.endpoint.trim_end_matches('/'),
      self.config.model
    )
  }

  /// Ask the model for a reflection on `text`. Never fails.
  pub async fn reflect(&self, category: Category, text: &str) -> String {
    match self.try_reflect(category, text).await {
      Ok(analysis) => analysis,
      Err(e) => {
        warn!(%category, "reflection unavailable: {e}");
        PLACEHOLDER.to_owned()
      }
    }
  }

  async fn try_reflect(
    &self,
    category: Category,
    text: &str,
  ) -> Result<String, ReflectionError> {
    let key = self
      .config
      .api_key
      .as_deref()
      .filter(|k| !k.is_empty())
      .ok_or(ReflectionError::MissingApiKey)?;

    let body = json!({
      "contents": [{ "parts": [{ "text": Self::prompt(category, text) }] }],
    });

    let resp = self
      .client
      .post(self.url())
      .query(&[("key", key)])
      .json(&body)
      .send()
      .await?;

    if !resp.status().is_success() {
      return Err(ReflectionError::Status(resp.status()));
    }

    let parsed: GenerateResponse = resp.json().await?;
    parsed.into_text().ok_or(ReflectionError::NoText)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extracts_first_candidate_text() {
    let raw = json!({
      "candidates": [
        { "content": { "parts": [{ "text": "You seem calm." }, { "text": "ignored" }] } },
        { "content": { "parts": [{ "text": "second" }] } }
      ]
    });
    let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
    assert_eq!(parsed.into_text().as_deref(), Some("You seem calm."));
  }

  #[test]
  fn missing_text_yields_none() {
    for raw in [
      json!({}),
      json!({ "candidates": [] }),
      json!({ "candidates": [{}] }),
      json!({ "candidates": [{ "content": { "parts": [] } }] }),
      json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] }),
      json!({ "error": { "code": 429 } }),
    ] {
      let parsed: GenerateResponse = serde_json::from_value(raw).unwrap();
      assert!(parsed.into_text().is_none());
    }
  }

  #[test]
  fn prompt_appends_user_text() {
    let p = ReflectionClient::prompt(Category::Habit, "walk = yes");
    assert!(p.starts_with("The following is a daily activities"));
    assert!(p.ends_with("\n\nwalk = yes"));
  }

  #[test]
  fn url_joins_model_path() {
    let client = ReflectionClient::new(ReflectionConfig {
      endpoint: "http://localhost:9/".into(),
      ..ReflectionConfig::default()
    })
    .unwrap();
    assert_eq!(
      client.url(),
      "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
    );
  }

  #[tokio::test]
  async fn no_key_returns_placeholder() {
    let client = ReflectionClient::new(ReflectionConfig::default()).unwrap();
    assert_eq!(client.reflect(Category::Journal, "today").await, PLACEHOLDER);
  }
}
