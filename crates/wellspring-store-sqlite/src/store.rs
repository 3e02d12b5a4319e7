//! [`SqliteStore`]: the SQLite implementation of [`WellnessStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;

use wellspring_core::{
  alert::{AlertRecord, NewAlert},
  category::{Category, OwnerId},
  entry::{Entry, NewEntry, SortOrder},
  store::{InsertOutcome, WellnessStore},
  streak::StreakRecord,
};

use crate::{
  Result,
  encode::{
    RawAlert, RawEntry, RawStreak, encode_day, encode_dt, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

/// True for UNIQUE / PRIMARY KEY violations, which the per-day guards turn
/// into [`InsertOutcome::Duplicate`].
fn is_unique_violation(e: &rusqlite::Error) -> bool {
  match e {
    rusqlite::Error::SqliteFailure(f, _) => matches!(
      f.extended_code,
      rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    ),
    _ => false,
  }
}

fn order_sql(order: SortOrder) -> &'static str {
  match order {
    SortOrder::Asc => "ASC",
    SortOrder::Desc => "DESC",
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Wellspring store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── WellnessStore impl ──────────────────────────────────────────────────────

impl WellnessStore for SqliteStore {
  type Error = crate::Error;

  // ── Entries ───────────────────────────────────────────────────────────────

  async fn insert_entry(&self, input: NewEntry) -> Result<InsertOutcome<Entry>> {
    let entry = input.into_entry();

    let id_str       = encode_uuid(entry.entry_id);
    let owner_str    = entry.owner.as_str().to_owned();
    let category_str = entry.category().as_str();
    let day_str      = encode_day(entry.day());
    let at_str       = encode_dt(entry.created_at);
    let body         = entry.value.to_text();

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO entries (entry_id, owner, category, day, created_at, body)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, owner_str, category_str, day_str, at_str, body],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(if inserted { InsertOutcome::Inserted(entry) } else { InsertOutcome::Duplicate })
  }

  async fn entry_exists_on(
    &self,
    owner:    OwnerId,
    category: Category,
    day:      NaiveDate,
  ) -> Result<bool> {
    let day_str = encode_day(day);

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM entries WHERE owner = ?1 AND category = ?2 AND day = ?3",
              rusqlite::params![owner.as_str(), category.as_str(), day_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn list_entries(
    &self,
    owner:    OwnerId,
    category: Category,
    order:    SortOrder,
  ) -> Result<Vec<Entry>> {
    let sql = format!(
      "SELECT entry_id, owner, category, created_at, body
       FROM entries
       WHERE owner = ?1 AND category = ?2
       ORDER BY created_at {}",
      order_sql(order)
    );

    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![owner.as_str(), category.as_str()],
            RawEntry::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }

  // ── Streaks ───────────────────────────────────────────────────────────────

  async fn get_streak(
    &self,
    owner:    OwnerId,
    category: Category,
  ) -> Result<Option<StreakRecord>> {
    let raw: Option<RawStreak> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT owner, category, streak_count, last_date
               FROM streaks WHERE owner = ?1 AND category = ?2",
              rusqlite::params![owner.as_str(), category.as_str()],
              |row| {
                Ok(RawStreak {
                  owner:     row.get(0)?,
                  category:  row.get(1)?,
                  count:     row.get(2)?,
                  last_date: row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStreak::into_record).transpose()
  }

  async fn put_streak(&self, record: StreakRecord) -> Result<()> {
    let owner_str    = record.owner.as_str().to_owned();
    let category_str = record.category.as_str();
    let count        = i64::from(record.count);
    let last_str     = record.last_date.map(encode_day);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO streaks (owner, category, streak_count, last_date)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (owner, category) DO UPDATE SET
             streak_count = excluded.streak_count,
             last_date    = excluded.last_date",
          rusqlite::params![owner_str, category_str, count, last_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Alerts ────────────────────────────────────────────────────────────────

  async fn alert_exists_on(&self, owner: OwnerId, day: NaiveDate) -> Result<bool> {
    let day_str = encode_day(day);

    let exists = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM alerts WHERE owner = ?1 AND day = ?2",
              rusqlite::params![owner.as_str(), day_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(exists)
  }

  async fn insert_alert(&self, input: NewAlert) -> Result<InsertOutcome<AlertRecord>> {
    let alert = input.into_record();

    let id_str     = encode_uuid(alert.alert_id);
    let owner_str  = alert.owner.as_str().to_owned();
    let day_str    = encode_day(alert.day());
    let at_str     = encode_dt(alert.created_at);
    let message    = alert.message.clone();
    let status_str = encode_status(alert.status);

    let inserted = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO alerts (alert_id, owner, day, created_at, message, status)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, owner_str, day_str, at_str, message, status_str],
        ) {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(if inserted { InsertOutcome::Inserted(alert) } else { InsertOutcome::Duplicate })
  }

  async fn list_alerts(&self, owner: OwnerId) -> Result<Vec<AlertRecord>> {
    let raws: Vec<RawAlert> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT alert_id, owner, created_at, message, status
           FROM alerts
           WHERE owner = ?1
           ORDER BY created_at DESC",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![owner.as_str()], RawAlert::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAlert::into_record).collect()
  }

  async fn mark_alert_read(
    &self,
    owner:      OwnerId,
    created_at: DateTime<Utc>,
  ) -> Result<bool> {
    let at_str = encode_dt(created_at);

    let matched = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE alerts SET status = 'read' WHERE owner = ?1 AND created_at = ?2",
          rusqlite::params![owner.as_str(), at_str],
        )?)
      })
      .await?;

    Ok(matched > 0)
  }
}
