//! Tracker operations: streak updates, daily alert evaluation, and the
//! dashboard read model.
//!
//! Every function is generic over [`WellnessStore`] and takes the current
//! time or date as an argument; the HTTP layer supplies `Utc::now()`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
  alert::{AlertRecord, NewAlert, compose_message, missing_categories},
  category::{Category, OwnerId},
  entry::{Entry, EntryValue, HabitSummary, Mood, NewEntry, SortOrder},
  store::{InsertOutcome, WellnessStore},
  streak::StreakRecord,
};

// ─── Entries ─────────────────────────────────────────────────────────────────

/// Store an entry and, if it was new for the day, advance the category's
/// streak. A failed streak update is logged and does not fail the insert.
pub async fn record_entry<S: WellnessStore>(
  store: &S,
  entry: NewEntry,
) -> Result<InsertOutcome<Entry>, S::Error> {
  let today = entry.created_at.date_naive();
  let outcome = store.insert_entry(entry).await?;

  if let InsertOutcome::Inserted(stored) = &outcome {
    let category = stored.category();
    if let Err(e) = update_streak(store, &stored.owner, category, today).await {
      warn!(owner = %stored.owner, %category, "failed to update streak: {e}");
    }
  }

  Ok(outcome)
}

// ─── Streaks ─────────────────────────────────────────────────────────────────

/// Count an activity on `today` towards the `(owner, category)` streak and
/// return the resulting streak length.
pub async fn update_streak<S: WellnessStore>(
  store: &S,
  owner: &OwnerId,
  category: Category,
  today: NaiveDate,
) -> Result<u32, S::Error> {
  let next = match store.get_streak(owner.clone(), category).await? {
    None => StreakRecord::started(owner.clone(), category, today),
    Some(existing) => match existing.advance(today) {
      Some(next) => next,
      None => return Ok(existing.count),
    },
  };

  debug!(%owner, %category, count = next.count, "streak advanced");
  let count = next.count;
  store.put_streak(next).await?;
  Ok(count)
}

/// The streak to display for `(owner, category)`; never writes.
pub async fn check_streak<S: WellnessStore>(
  store: &S,
  owner: &OwnerId,
  category: Category,
  today: NaiveDate,
) -> Result<u32, S::Error> {
  Ok(
    store
      .get_streak(owner.clone(), category)
      .await?
      .map_or(0, |r| r.visible_count(today)),
  )
}

// ─── Alerts ──────────────────────────────────────────────────────────────────

/// What [`evaluate_today`] did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AlertEvaluation {
  /// An alert for today already existed (or a concurrent check won the race).
  AlreadyAlerted,
  /// Every category has an entry today; nothing was written.
  AllPresent,
  Alerted { alert: AlertRecord },
}

/// Record a reminder for `owner` if any category lacks an entry on the UTC
/// day of `now`. At most one alert is written per owner and day.
pub async fn evaluate_today<S: WellnessStore>(
  store: &S,
  owner: &OwnerId,
  now: DateTime<Utc>,
) -> Result<AlertEvaluation, S::Error> {
  let today = now.date_naive();
  if store.alert_exists_on(owner.clone(), today).await? {
    return Ok(AlertEvaluation::AlreadyAlerted);
  }

  let mut submitted = Vec::new();
  for category in Category::all() {
    let present = store.entry_exists_on(owner.clone(), category, today).await?;
    submitted.push((category, present));
  }

  let missing = missing_categories(submitted);
  if missing.is_empty() {
    return Ok(AlertEvaluation::AllPresent);
  }

  let alert = NewAlert {
    owner:      owner.clone(),
    created_at: now,
    message:    compose_message(&missing),
  };

  match store.insert_alert(alert).await? {
    InsertOutcome::Inserted(alert) => {
      info!(%owner, ?missing, "recorded daily reminder");
      Ok(AlertEvaluation::Alerted { alert })
    }
    InsertOutcome::Duplicate => Ok(AlertEvaluation::AlreadyAlerted),
  }
}

/// Insert a caller-composed alert for the UTC day of `now`. A duplicate for
/// the same day is reported as success.
pub async fn insert_alert<S: WellnessStore>(
  store: &S,
  owner: &OwnerId,
  message: String,
  now: DateTime<Utc>,
) -> Result<(), S::Error> {
  let alert = NewAlert { owner: owner.clone(), created_at: now, message };
  if store.insert_alert(alert).await?.is_duplicate() {
    debug!(%owner, "alert already recorded today");
  }
  Ok(())
}

/// Transition an alert to read. Idempotent.
pub async fn mark_alert_read<S: WellnessStore>(
  store: &S,
  owner: &OwnerId,
  created_at: DateTime<Utc>,
) -> Result<(), S::Error> {
  if !store.mark_alert_read(owner.clone(), created_at).await? {
    debug!(%owner, %created_at, "mark-read matched no alert");
  }
  Ok(())
}

pub async fn unread_count<S: WellnessStore>(
  store: &S,
  owner: &OwnerId,
) -> Result<usize, S::Error> {
  let alerts = store.list_alerts(owner.clone()).await?;
  Ok(alerts.iter().filter(|a| a.is_unread()).count())
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// Read-only per-category streaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Streaks {
  pub mood:    u32,
  pub journal: u32,
  pub habit:   u32,
}

/// The home screen read model. Derived on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dashboard {
  pub today:         NaiveDate,
  pub last_mood:     Option<Mood>,
  pub journal_today: bool,
  pub habits_today:  Option<HabitSummary>,
  pub streaks:       Streaks,
}

pub async fn dashboard<S: WellnessStore>(
  store: &S,
  owner: &OwnerId,
  today: NaiveDate,
) -> Result<Dashboard, S::Error> {
  let moods = store
    .list_entries(owner.clone(), Category::Mood, SortOrder::Desc)
    .await?;
  let last_mood = moods.iter().find_map(|e| match e.value {
    EntryValue::Mood(m) => Some(m),
    _ => None,
  });

  let journal_today = store
    .entry_exists_on(owner.clone(), Category::Journal, today)
    .await?;

  let habits = store
    .list_entries(owner.clone(), Category::Habit, SortOrder::Desc)
    .await?;
  let habits_today = habits
    .iter()
    .filter(|e| e.day() == today)
    .find_map(|e| match &e.value {
      EntryValue::Habit(c) => Some(c.summary()),
      _ => None,
    });

  let streaks = Streaks {
    mood:    check_streak(store, owner, Category::Mood, today).await?,
    journal: check_streak(store, owner, Category::Journal, today).await?,
    habit:   check_streak(store, owner, Category::Habit, today).await?,
  };

  Ok(Dashboard { today, last_mood, journal_today, habits_today, streaks })
}
