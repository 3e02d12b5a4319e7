//! The `WellnessStore` trait.
//!
//! The trait is implemented by storage backends (e.g.
//! `wellspring-store-sqlite`). The tracker operations and the HTTP layer depend
//! on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};

use crate::{
  alert::{AlertRecord, NewAlert},
  category::{Category, OwnerId},
  entry::{Entry, NewEntry, SortOrder},
  streak::StreakRecord,
};

/// Result of an insert guarded by a per-day uniqueness constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<T> {
  Inserted(T),
  /// A row for the same owner and day already existed; nothing was written.
  Duplicate,
}

impl<T> InsertOutcome<T> {
  pub fn inserted(self) -> Option<T> {
    match self {
      Self::Inserted(t) => Some(t),
      Self::Duplicate => None,
    }
  }

  pub fn is_duplicate(&self) -> bool { matches!(self, Self::Duplicate) }
}

/// Abstraction over a Wellspring storage backend.
///
/// Entries and alerts carry a uniqueness constraint per owner and UTC day;
/// backends must report a violation as [`InsertOutcome::Duplicate`] rather
/// than as an error.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait WellnessStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Entries ───────────────────────────────────────────────────────────

  /// Store a new entry. The day is the UTC date of `created_at`.
  fn insert_entry(
    &self,
    entry: NewEntry,
  ) -> impl Future<Output = Result<InsertOutcome<Entry>, Self::Error>> + Send + '_;

  /// Whether an entry exists for `(owner, category, day)`.
  fn entry_exists_on(
    &self,
    owner: OwnerId,
    category: Category,
    day: NaiveDate,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All entries of one category for an owner, ordered by `created_at`.
  fn list_entries(
    &self,
    owner: OwnerId,
    category: Category,
    order: SortOrder,
  ) -> impl Future<Output = Result<Vec<Entry>, Self::Error>> + Send + '_;

  // ── Streaks ───────────────────────────────────────────────────────────

  fn get_streak(
    &self,
    owner: OwnerId,
    category: Category,
  ) -> impl Future<Output = Result<Option<StreakRecord>, Self::Error>> + Send + '_;

  /// Insert or replace the record for `(record.owner, record.category)`.
  fn put_streak(
    &self,
    record: StreakRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Alerts ────────────────────────────────────────────────────────────

  fn alert_exists_on(
    &self,
    owner: OwnerId,
    day: NaiveDate,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn insert_alert(
    &self,
    alert: NewAlert,
  ) -> impl Future<Output = Result<InsertOutcome<AlertRecord>, Self::Error>> + Send + '_;

  /// All alerts for an owner, newest first.
  fn list_alerts(
    &self,
    owner: OwnerId,
  ) -> impl Future<Output = Result<Vec<AlertRecord>, Self::Error>> + Send + '_;

  /// Set the alert created at `created_at` to read. Returns whether a
  /// matching alert exists; marking an already-read alert is not an error.
  fn mark_alert_read(
    &self,
    owner: OwnerId,
    created_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
