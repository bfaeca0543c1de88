//! User profiles.
//!
//! There is no authentication: a user is a named profile that one person picks
//! on each device. The chosen profile stamps every mutation as its actor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A shared profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub name:       String,
  pub avatar_url: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input for creating a user; the id and timestamp are minted by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
  pub name:       String,
  pub avatar_url: Option<String>,
}

impl NewUser {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), avatar_url: None }
  }

  /// Trim the name and reject it if blank.
  pub fn validate(self) -> Result<Self> {
    let name = crate::trimmed(&self.name).ok_or(Error::EmptyName)?;
    Ok(Self { name, ..self })
  }
}

/// Trim a replacement display name and reject it if blank.
pub fn validate_name(name: &str) -> Result<String> {
  crate::trimmed(name).ok_or(Error::EmptyName)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn blank_name_is_rejected() {
    assert!(matches!(NewUser::new("   ").validate(), Err(Error::EmptyName)));
    assert!(matches!(validate_name(""), Err(Error::EmptyName)));
  }

  #[test]
  fn name_is_trimmed() {
    let user = NewUser::new("  Linh ").validate().unwrap();
    assert_eq!(user.name, "Linh");
  }
}
