//! Activity entries: the single daily record a user submits per category.
//!
//! An entry is immutable once stored. The store guarantees at most one entry
//! per owner, category, and UTC calendar day.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  category::{Category, OwnerId},
};

// ─── Mood ────────────────────────────────────────────────────────────────────

/// The moods offered by the mood tracker.
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
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Mood {
  Angry,
  Sad,
  Lazy,
  Happy,
  Excited,
  Tired,
  Heartbroken,
  Playful,
}

impl Mood {
  pub fn parse(raw: &str) -> Result<Self> {
    Mood::from_str(raw.trim()).map_err(|_| Error::UnknownMood(raw.to_owned()))
  }
}

// ─── Habit checklist ─────────────────────────────────────────────────────────

/// One line of the daily habit checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitItem {
  pub name: String,
  pub done: bool,
}

/// The daily habit checklist, written as `"walk = yes, read = no"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HabitChecklist {
  pub items: Vec<HabitItem>,
}

/// `done/total` for a checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitSummary {
  pub done:  usize,
  pub total: usize,
}

impl HabitChecklist {
  pub fn summary(&self) -> HabitSummary {
    HabitSummary {
      done:  self.items.iter().filter(|i| i.done).count(),
      total: self.items.len(),
    }
  }
}

impl FromStr for HabitChecklist {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let mut items = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
      let (name, answer) = part
        .split_once('=')
        .ok_or_else(|| Error::MalformedHabit(part.to_owned()))?;
      let name = name.trim();
      if name.is_empty() {
        return Err(Error::MalformedHabit(part.to_owned()));
      }
      let done = match answer.trim().to_ascii_lowercase().as_str() {
        "yes" => true,
        "no" => false,
        _ => return Err(Error::MalformedHabit(part.to_owned())),
      };
      items.push(HabitItem { name: name.to_owned(), done });
    }
    if items.is_empty() {
      return Err(Error::MalformedHabit(s.to_owned()));
    }
    Ok(Self { items })
  }
}

impl fmt::Display for HabitChecklist {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, item) in self.items.iter().enumerate() {
      if i > 0 {
        f.write_str(", ")?;
      }
      let answer = if item.done { "yes" } else { "no" };
      write!(f, "{} = {answer}", item.name)?;
    }
    Ok(())
  }
}

impl TryFrom<String> for HabitChecklist {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

impl From<HabitChecklist> for String {
  fn from(c: HabitChecklist) -> Self { c.to_string() }
}

// ─── EntryValue ──────────────────────────────────────────────────────────────

/// The typed payload of an entry. The variant determines the category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum EntryValue {
  Mood(Mood),
  Journal(String),
  Habit(HabitChecklist),
}

impl EntryValue {
  pub fn category(&self) -> Category {
    match self {
      Self::Mood(_) => Category::Mood,
      Self::Journal(_) => Category::Journal,
      Self::Habit(_) => Category::Habit,
    }
  }

  /// Build a value for `category` from the raw text a client submitted.
  pub fn from_text(category: Category, raw: &str) -> Result<Self> {
    match category {
      Category::Mood => Ok(Self::Mood(Mood::parse(raw)?)),
      Category::Journal => {
        if raw.trim().is_empty() {
          return Err(Error::EmptyJournal);
        }
        Ok(Self::Journal(raw.to_owned()))
      }
      Category::Habit => Ok(Self::Habit(raw.parse()?)),
    }
  }

  /// The plain-text form stored in the `body` column.
  pub fn to_text(&self) -> String {
    match self {
      Self::Mood(m) => m.to_string(),
      Self::Journal(t) => t.clone(),
      Self::Habit(c) => c.to_string(),
    }
  }
}

// ─── Entry ───────────────────────────────────────────────────────────────────

/// A stored activity entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
  pub entry_id:   Uuid,
  pub owner:      OwnerId,
  pub value:      EntryValue,
  /// Server-assigned; the UTC date of this instant is the entry's day.
  pub created_at: DateTime<Utc>,
}

impl Entry {
  pub fn category(&self) -> Category { self.value.category() }

  pub fn day(&self) -> NaiveDate { self.created_at.date_naive() }
}

/// Input to [`crate::store::WellnessStore::insert_entry`].
#[derive(Debug, Clone)]
pub struct NewEntry {
  pub owner:      OwnerId,
  pub value:      EntryValue,
  pub created_at: DateTime<Utc>,
}

impl NewEntry {
  pub fn into_entry(self) -> Entry {
    Entry {
      entry_id:   Uuid::new_v4(),
      owner:      self.owner,
      value:      self.value,
      created_at: self.created_at,
    }
  }
}

/// Ordering for history queries, by `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  Asc,
  #[default]
  Desc,
}

impl SortOrder {
  /// The default the history views expect for each category.
  pub fn default_for(category: Category) -> Self {
    match category {
      Category::Mood => SortOrder::Asc,
      Category::Journal | Category::Habit => SortOrder::Desc,
    }
  }
}

// ─── Mood distribution ───────────────────────────────────────────────────────

/// Percentage share of each mood over the most recent `window` entries
/// (or all entries when `window` is `None`), rounded to two decimals.
///
/// `entries` must be in chronological order. Returns `None` when there is
/// not enough history to fill the window.
pub fn mood_distribution(
  entries: &[Entry],
  window: Option<usize>,
) -> Option<BTreeMap<Mood, f64>> {
  let moods: Vec<Mood> = entries
    .iter()
    .filter_map(|e| match e.value {
      EntryValue::Mood(m) => Some(m),
      _ => None,
    })
    .collect();

  let slice = match window {
    Some(0) => return None,
    Some(n) if moods.len() < n => return None,
    Some(n) => &moods[moods.len() - n..],
    None if moods.is_empty() => return None,
    None => &moods[..],
  };

  let total = slice.len() as f64;
  let mut counts: BTreeMap<Mood, usize> = BTreeMap::new();
  for m in slice {
    *counts.entry(*m).or_default() += 1;
  }
  Some(
    counts
      .into_iter()
      .map(|(m, c)| (m, (c as f64 / total * 10_000.0).round() / 100.0))
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn mood_entry(m: Mood, day: u32) -> Entry {
    NewEntry {
      owner:      OwnerId::parse("u").unwrap(),
      value:      EntryValue::Mood(m),
      created_at: Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap(),
    }
    .into_entry()
  }

  #[test]
  fn checklist_parses_and_summarises() {
    let c: HabitChecklist = "walk = yes, read = no,  meditate = yes".parse().unwrap();
    assert_eq!(c.items.len(), 3);
    assert_eq!(c.summary(), HabitSummary { done: 2, total: 3 });
    assert_eq!(c.to_string(), "walk = yes, read = no, meditate = yes");
  }

  #[test]
  fn checklist_rejects_garbage() {
    assert!("walk".parse::<HabitChecklist>().is_err());
    assert!("walk = maybe".parse::<HabitChecklist>().is_err());
    assert!(" = yes".parse::<HabitChecklist>().is_err());
    assert!("".parse::<HabitChecklist>().is_err());
  }

  #[test]
  fn from_text_validates_per_category() {
    assert_eq!(
      EntryValue::from_text(Category::Mood, "Happy").unwrap(),
      EntryValue::Mood(Mood::Happy)
    );
    assert!(matches!(
      EntryValue::from_text(Category::Mood, "meh"),
      Err(Error::UnknownMood(_))
    ));
    assert!(matches!(
      EntryValue::from_text(Category::Journal, "  "),
      Err(Error::EmptyJournal)
    ));
    let habit = EntryValue::from_text(Category::Habit, "walk = yes").unwrap();
    assert_eq!(habit.category(), Category::Habit);
  }

  #[test]
  fn distribution_over_window() {
    let entries = vec![
      mood_entry(Mood::Sad, 1),
      mood_entry(Mood::Happy, 2),
      mood_entry(Mood::Happy, 3),
      mood_entry(Mood::Tired, 4),
    ];

    let last3 = mood_distribution(&entries, Some(3)).unwrap();
    assert_eq!(last3.get(&Mood::Happy), Some(&66.67));
    assert_eq!(last3.get(&Mood::Tired), Some(&33.33));
    assert!(!last3.contains_key(&Mood::Sad));

    let all = mood_distribution(&entries, None).unwrap();
    assert_eq!(all.get(&Mood::Happy), Some(&50.0));
  }

  #[test]
  fn distribution_needs_enough_history() {
    let entries = vec![mood_entry(Mood::Sad, 1)];
    assert!(mood_distribution(&entries, Some(7)).is_none());
    assert!(mood_distribution(&[], None).is_none());
  }
}
