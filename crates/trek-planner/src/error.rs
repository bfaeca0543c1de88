//! Error type for `trek-planner`.
//!
//! Variants follow how a failure is presented: validation problems are shown
//! verbatim, every backend failure collapses into one generic message.

use thiserror::Error;
use uuid::Uuid;

use crate::{labels::Locale, storage::StorageError};

#[derive(Debug, Error)]
pub enum Error {
  /// Input rejected before any write was attempted.
  #[error("invalid input: {0}")]
  Validation(#[from] trek_core::Error),

  #[error("no active identity")]
  NoActiveIdentity,

  #[error("no place selected")]
  NoPlaceSelected,

  /// The id is not part of what the view currently holds.
  #[error("{kind} not found: {id}")]
  NotFound { kind: &'static str, id: Uuid },

  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("local storage error: {0}")]
  Storage(#[from] StorageError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
  pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Backend(Box::new(err))
  }

  pub(crate) fn not_found(kind: &'static str, id: Uuid) -> Self { Self::NotFound { kind, id } }

  /// The message shown to the user for this failure.
  pub fn user_message(&self, locale: Locale) -> String {
    use trek_core::Error as Core;

    let (en, de) = match self {
      Self::Validation(Core::EmptyName) => ("Name is required", "Name ist erforderlich"),
      Self::Validation(Core::EmptyTitle) => ("Title is required", "Titel ist erforderlich"),
      Self::Validation(Core::InvalidLink(_)) => {
        ("Link must be a valid URL", "Link muss eine gültige URL sein")
      }
      Self::Validation(_) => ("Invalid input", "Ungültige Eingabe"),
      Self::NoActiveIdentity => {
        ("Please choose a profile first", "Bitte wähle zuerst einen Benutzer")
      }
      Self::NoPlaceSelected => ("Choose a place first", "Bitte wähle zuerst einen Ort"),
      Self::NotFound { .. } => ("That entry no longer exists", "Eintrag nicht mehr vorhanden"),
      Self::Backend(_) => ("Saving failed", "Fehler beim Speichern"),
      Self::Storage(_) => {
        ("Could not remember the profile", "Profil konnte nicht gespeichert werden")
      }
    };
    locale.pick(en, de).to_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn backend_failures_share_one_message() {
    let io = std::io::Error::other("disk on fire");
    let err = Error::backend(io);
    assert_eq!(err.user_message(Locale::En), "Saving failed");
    assert_eq!(err.user_message(Locale::De), "Fehler beim Speichern");
  }

  #[test]
  fn validation_messages_are_specific() {
    let err = Error::from(trek_core::Error::InvalidLink("ftp://x".into()));
    assert_eq!(err.user_message(Locale::De), "Link muss eine gültige URL sein");
    assert_eq!(
      Error::NoActiveIdentity.user_message(Locale::En),
      "Please choose a profile first"
    );
  }
}
