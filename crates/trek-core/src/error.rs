//! Error types for `trek-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("name must not be empty")]
  EmptyName,

  #[error("title must not be empty")]
  EmptyTitle,

  #[error("link must start with http:// or https://: {0:?}")]
  InvalidLink(String),

  #[error("vote value must be +1 or -1, got {0}")]
  InvalidVoteValue(i64),

  #[error("unknown {kind} discriminant: {value:?}")]
  UnknownDiscriminant { kind: &'static str, value: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
