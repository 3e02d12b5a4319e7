//! Error type for `wellspring-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] wellspring_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value the domain types do not recognise.
  #[error("corrupt row: {0}")]
  Corrupt(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
