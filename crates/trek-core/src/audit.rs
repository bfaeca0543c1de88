//! Audit records, the append-only trail of accepted mutations.
//!
//! Records carry full or partial before/after snapshots as arbitrary JSON,
//! never diffs. The store assigns `audit_id` and `created_at`; nothing ever
//! updates or deletes a record.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, Result, user::User};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
  Create,
  Update,
  Delete,
  Reorder,
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
  RouteItem,
  Suggestion,
  Vote,
  Todo,
  Place,
  User,
}

// ─── Entity reference ────────────────────────────────────────────────────────

/// The subject of an audit record: a row id, or a sentinel for operations
/// that have no single subject row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EntityRef {
  Row(Uuid),
  /// A whole-route auto sort; no single item is the mover.
  AutoRoute,
}

impl EntityRef {
  pub const AUTO_ROUTE: &'static str = "auto-route";

  pub fn row(&self) -> Option<Uuid> {
    match self {
      Self::Row(id) => Some(*id),
      Self::AutoRoute => None,
    }
  }
}

impl From<Uuid> for EntityRef {
  fn from(id: Uuid) -> Self { Self::Row(id) }
}

impl fmt::Display for EntityRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Row(id) => write!(f, "{}", id.hyphenated()),
      Self::AutoRoute => f.write_str(Self::AUTO_ROUTE),
    }
  }
}

impl FromStr for EntityRef {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    if s == Self::AUTO_ROUTE {
      return Ok(Self::AutoRoute);
    }
    Uuid::parse_str(s)
      .map(Self::Row)
      .map_err(|_| Error::UnknownDiscriminant { kind: "entity ref", value: s.to_owned() })
  }
}

impl From<EntityRef> for String {
  fn from(r: EntityRef) -> Self { r.to_string() }
}

impl TryFrom<String> for EntityRef {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { s.parse() }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Input for appending an audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditRecord {
  pub action:      ActionKind,
  pub entity_kind: EntityKind,
  pub entity_id:   EntityRef,
  /// `None` when no identity was active.
  pub actor_id:    Option<Uuid>,
  pub before:      Option<Value>,
  pub after:       Option<Value>,
}

impl NewAuditRecord {
  pub fn new(action: ActionKind, entity_kind: EntityKind, entity_id: impl Into<EntityRef>) -> Self {
    Self {
      action,
      entity_kind,
      entity_id: entity_id.into(),
      actor_id: None,
      before: None,
      after: None,
    }
  }

  pub fn before(mut self, snapshot: Option<Value>) -> Self {
    self.before = snapshot;
    self
  }

  pub fn after(mut self, snapshot: Option<Value>) -> Self {
    self.after = snapshot;
    self
  }

  pub fn actor(mut self, actor_id: Option<Uuid>) -> Self {
    self.actor_id = actor_id;
    self
  }
}

/// A persisted audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
  pub audit_id:    Uuid,
  pub action:      ActionKind,
  pub entity_kind: EntityKind,
  pub entity_id:   EntityRef,
  pub actor_id:    Option<Uuid>,
  pub before:      Option<Value>,
  pub after:       Option<Value>,
  pub created_at:  DateTime<Utc>,
}

/// An audit record joined with its actor. `actor` is `None` both when no actor
/// was recorded and when the recorded actor no longer resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
  pub record: AuditRecord,
  pub actor:  Option<User>,
}

/// Serialise any snapshot into a JSON value for an audit payload.
pub fn snapshot<T: Serialize>(value: &T) -> Result<Value> { Ok(serde_json::to_value(value)?) }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn entity_ref_text_form() {
    let id = Uuid::new_v4();
    assert_eq!(EntityRef::Row(id).to_string(), id.to_string());
    assert_eq!(EntityRef::AutoRoute.to_string(), "auto-route");
    assert_eq!("auto-route".parse::<EntityRef>().unwrap(), EntityRef::AutoRoute);
    assert_eq!(id.to_string().parse::<EntityRef>().unwrap(), EntityRef::Row(id));
    assert!("route-7".parse::<EntityRef>().is_err());
  }

  #[test]
  fn entity_ref_serde_is_plain_string() {
    let json = serde_json::to_string(&EntityRef::AutoRoute).unwrap();
    assert_eq!(json, "\"auto-route\"");
    let back: EntityRef = serde_json::from_str(&json).unwrap();
    assert_eq!(back, EntityRef::AutoRoute);
  }

  #[test]
  fn kind_wire_names() {
    assert_eq!(EntityKind::RouteItem.as_ref(), "route_item");
    assert_eq!("reorder".parse::<ActionKind>().unwrap(), ActionKind::Reorder);
  }
}
