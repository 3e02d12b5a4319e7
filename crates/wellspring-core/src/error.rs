//! Error types for `wellspring-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("owner identifier must not be empty")]
  EmptyOwner,

  #[error("unknown category: {0:?}")]
  UnknownCategory(String),

  #[error("unknown mood: {0:?}")]
  UnknownMood(String),

  #[error("journal text must not be empty")]
  EmptyJournal,

  #[error("malformed habit item: {0:?}")]
  MalformedHabit(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
