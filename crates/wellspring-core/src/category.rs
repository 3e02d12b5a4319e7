//! Owner identity and the fixed set of tracked categories.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};

use crate::{Error, Result};

// ─── OwnerId ─────────────────────────────────────────────────────────────────

/// Stable per-user identifier issued by the external identity provider.
///
/// The value is opaque to this crate; the only constraint is that it is not
/// blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
  /// Validate and wrap a raw identifier. Surrounding whitespace is trimmed.
  pub fn parse(raw: impl AsRef<str>) -> Result<Self> {
    let trimmed = raw.as_ref().trim();
    if trimmed.is_empty() {
      return Err(Error::EmptyOwner);
    }
    Ok(Self(trimmed.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for OwnerId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl<'de> Deserialize<'de> for OwnerId {
  fn deserialize<D: serde::Deserializer<'de>>(
    deserializer: D,
  ) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    OwnerId::parse(raw).map_err(serde::de::Error::custom)
  }
}

// ─── Category ────────────────────────────────────────────────────────────────

/// A tracked activity kind. Streaks and daily reminders are namespaced by
/// category.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumIter,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Category {
  Mood,
  Journal,
  /// Clients send both "habit" and "habits".
  #[serde(alias = "habits")]
  #[strum(to_string = "habit", serialize = "habits")]
  Habit,
}

impl Category {
  /// All categories in reminder order: mood, journal, habit.
  pub fn all() -> impl Iterator<Item = Category> { Category::iter() }

  /// The string stored in the `category` columns.
  pub fn as_str(self) -> &'static str { self.into() }

  /// Parse user input, mapping failures into the crate error type.
  pub fn parse(raw: &str) -> Result<Self> {
    Category::from_str(raw.trim())
      .map_err(|_| Error::UnknownCategory(raw.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn owner_rejects_blank() {
    assert!(matches!(OwnerId::parse("   "), Err(Error::EmptyOwner)));
    assert_eq!(OwnerId::parse(" abc ").unwrap().as_str(), "abc");
  }

  #[test]
  fn owner_deserialize_validates() {
    let ok: OwnerId = serde_json::from_str("\"u1\"").unwrap();
    assert_eq!(ok.as_str(), "u1");
    assert!(serde_json::from_str::<OwnerId>("\"\"").is_err());
  }

  #[test]
  fn category_parse_accepts_aliases_and_case() {
    assert_eq!(Category::parse("mood").unwrap(), Category::Mood);
    assert_eq!(Category::parse("Journal").unwrap(), Category::Journal);
    assert_eq!(Category::parse("habits").unwrap(), Category::Habit);
    assert_eq!(Category::parse("habit").unwrap(), Category::Habit);
    assert!(matches!(
      Category::parse("sleep"),
      Err(Error::UnknownCategory(s)) if s == "sleep"
    ));
  }

  #[test]
  fn category_display_is_canonical() {
    assert_eq!(Category::Habit.to_string(), "habit");
    assert_eq!(Category::Mood.as_str(), "mood");
    let order: Vec<_> = Category::all().collect();
    assert_eq!(order, [Category::Mood, Category::Journal, Category::Habit]);
  }

  #[test]
  fn category_serde_round_trip_uses_lowercase() {
    assert_eq!(
      serde_json::to_string(&Category::Journal).unwrap(),
      "\"journal\""
    );
    let h: Category = serde_json::from_str("\"habits\"").unwrap();
    assert_eq!(h, Category::Habit);
  }
}
