//! Streak rules.
//!
//! A streak counts consecutive UTC calendar days with at least one entry in a
//! category. Everything here is pure: callers pass `today` explicitly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::category::{Category, OwnerId};

/// The persisted streak state for one `(owner, category)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakRecord {
  pub owner:     OwnerId,
  pub category:  Category,
  pub count:     u32,
  /// The last day that contributed to `count`. `None` only for rows written
  /// by older clients that never set it.
  pub last_date: Option<NaiveDate>,
}

/// What a new activity does to an existing streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakStep {
  /// No usable history: the streak (re)starts at 1.
  Start,
  /// Today was already counted, or the record is dated in the future.
  AlreadyCounted,
  /// Last counted yesterday: the streak grows by one.
  Extend,
  /// Two or more days were missed: the streak resets to 1.
  Reset,
}

/// Whole calendar days from `last` to `today`; negative when `last` is after
/// `today`.
pub fn day_gap(last: NaiveDate, today: NaiveDate) -> i64 {
  (today - last).num_days()
}

impl StreakRecord {
  /// A fresh record for a first activity on `today`.
  pub fn started(owner: OwnerId, category: Category, today: NaiveDate) -> Self {
    Self { owner, category, count: 1, last_date: Some(today) }
  }

  pub fn step(&self, today: NaiveDate) -> StreakStep {
    let Some(last) = self.last_date else {
      return StreakStep::Start;
    };
    match day_gap(last, today) {
      i64::MIN..=0 => StreakStep::AlreadyCounted,
      1 => StreakStep::Extend,
      _ => StreakStep::Reset,
    }
  }

  /// Apply an activity on `today`. Returns the new record, or `None` when the
  /// stored record is already correct and nothing needs to be written.
  pub fn advance(&self, today: NaiveDate) -> Option<StreakRecord> {
    let count = match self.step(today) {
      StreakStep::AlreadyCounted => return None,
      StreakStep::Extend => self.count.saturating_add(1),
      StreakStep::Start | StreakStep::Reset => 1,
    };
    Some(StreakRecord {
      owner: self.owner.clone(),
      category: self.category,
      count,
      last_date: Some(today),
    })
  }

  /// The streak to display without recording anything: the stored count
  /// while it is still alive (last counted today or yesterday), otherwise 0.
  pub fn visible_count(&self, today: NaiveDate) -> u32 {
    match self.last_date {
      Some(last) if day_gap(last, today) < 2 => self.count,
      _ => 0,
    }
  }
}
