//! Error type for `trek-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] trek_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column could not be decoded (date, timestamp, enum name).
  #[error("decode error: {0}")]
  Decode(String),

  #[error("user not found: {0}")]
  UserNotFound(uuid::Uuid),

  #[error("place not found: {0}")]
  PlaceNotFound(uuid::Uuid),

  #[error("route item not found: {0}")]
  RouteItemNotFound(uuid::Uuid),

  #[error("suggestion not found: {0}")]
  SuggestionNotFound(uuid::Uuid),

  #[error("todo not found: {0}")]
  TodoNotFound(uuid::Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
