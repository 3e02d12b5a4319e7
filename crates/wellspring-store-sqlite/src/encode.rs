//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Instants are stored as fixed-width RFC 3339 strings (microseconds, `Z`
//! suffix) so that text ordering matches time ordering. Calendar days are
//! `YYYY-MM-DD`; UUIDs are hyphenated lowercase strings.

use std::str::FromStr as _;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;
use wellspring_core::{
  alert::{AlertRecord, AlertStatus},
  category::{Category, OwnerId},
  entry::{Entry, EntryValue},
  streak::StreakRecord,
};

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_day(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_day(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Enums ────────────────────────────────────────────────────────────────────

pub fn decode_category(s: &str) -> Result<Category> {
  Category::parse(s).map_err(|_| Error::Corrupt(format!("unknown category: {s:?}")))
}

pub fn encode_status(s: AlertStatus) -> &'static str { s.into() }

pub fn decode_status(s: &str) -> Result<AlertStatus> {
  AlertStatus::from_str(s)
    .map_err(|_| Error::Corrupt(format!("unknown alert status: {s:?}")))
}

fn decode_owner(s: &str) -> Result<OwnerId> {
  OwnerId::parse(s).map_err(|_| Error::Corrupt("empty owner".to_owned()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `entries` row.
pub struct RawEntry {
  pub entry_id:   String,
  pub owner:      String,
  pub category:   String,
  pub created_at: String,
  pub body:       String,
}

impl RawEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:   row.get(0)?,
      owner:      row.get(1)?,
      category:   row.get(2)?,
      created_at: row.get(3)?,
      body:       row.get(4)?,
    })
  }

  pub fn into_entry(self) -> Result<Entry> {
    let category = decode_category(&self.category)?;
    Ok(Entry {
      entry_id:   decode_uuid(&self.entry_id)?,
      owner:      decode_owner(&self.owner)?,
      value:      EntryValue::from_text(category, &self.body)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read directly from a `streaks` row.
pub struct RawStreak {
  pub owner:     String,
  pub category:  String,
  pub count:     i64,
  pub last_date: Option<String>,
}

impl RawStreak {
  pub fn into_record(self) -> Result<StreakRecord> {
    let count = u32::try_from(self.count)
      .map_err(|_| Error::Corrupt(format!("streak count out of range: {}", self.count)))?;
    Ok(StreakRecord {
      owner: decode_owner(&self.owner)?,
      category: decode_category(&self.category)?,
      count,
      last_date: self.last_date.as_deref().map(decode_day).transpose()?,
    })
  }
}

/// Raw strings read directly from an `alerts` row.
pub struct RawAlert {
  pub alert_id:   String,
  pub owner:      String,
  pub created_at: String,
  pub message:    String,
  pub status:     String,
}

impl RawAlert {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      alert_id:   row.get(0)?,
      owner:      row.get(1)?,
      created_at: row.get(2)?,
      message:    row.get(3)?,
      status:     row.get(4)?,
    })
  }

  pub fn into_record(self) -> Result<AlertRecord> {
    Ok(AlertRecord {
      alert_id:   decode_uuid(&self.alert_id)?,
      owner:      decode_owner(&self.owner)?,
      created_at: decode_dt(&self.created_at)?,
      message:    self.message,
      status:     decode_status(&self.status)?,
    })
  }
}
