//! Daily reminder alerts.
//!
//! At most one alert exists per owner and UTC calendar day. Its status moves
//! from `unread` to `read` and never back.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::category::{Category, OwnerId};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertStatus {
  #[default]
  Unread,
  Read,
}

/// A stored reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
  pub alert_id:   Uuid,
  pub owner:      OwnerId,
  pub created_at: DateTime<Utc>,
  pub message:    String,
  pub status:     AlertStatus,
}

impl AlertRecord {
  pub fn day(&self) -> NaiveDate { self.created_at.date_naive() }

  pub fn is_unread(&self) -> bool { self.status == AlertStatus::Unread }
}

/// Input to [`crate::store::WellnessStore::insert_alert`]. New alerts are
/// always unread.
#[derive(Debug, Clone)]
pub struct NewAlert {
  pub owner:      OwnerId,
  pub created_at: DateTime<Utc>,
  pub message:    String,
}

impl NewAlert {
  pub fn into_record(self) -> AlertRecord {
    AlertRecord {
      alert_id:   Uuid::new_v4(),
      owner:      self.owner,
      created_at: self.created_at,
      message:    self.message,
      status:     AlertStatus::Unread,
    }
  }
}

/// Categories not yet submitted, in the order given.
///
/// `submitted` yields each category with whether it has an entry today.
pub fn missing_categories<I>(submitted: I) -> Vec<Category>
where
  I: IntoIterator<Item = (Category, bool)>,
{
  submitted
    .into_iter()
    .filter(|(_, present)| !present)
    .map(|(category, _)| category)
    .collect()
}

/// The reminder text naming every missing category.
pub fn compose_message(missing: &[Category]) -> String {
  let names: Vec<&str> = missing.iter().map(|c| c.as_str()).collect();
  format!(
    "Alert! You have not entered your {} for today",
    names.join(" and ")
  )
}
