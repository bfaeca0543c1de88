//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so that lexical order equals chronological order.
//! Calendar dates are `YYYY-MM-DD`. Enums use their snake_case wire names.
//! UUIDs are stored as hyphenated lowercase strings.

use std::{collections::HashMap, str::FromStr};

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use rusqlite::Row;
use trek_core::{
  audit::{AuditEntry, AuditRecord},
  place::Place,
  route::{RouteItem, RouteStop},
  suggestion::{ScoredSuggestion, Suggestion, Vote, VoteValue},
  todo::{Todo, TodoView},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_uuid_opt(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

/// The current time at the precision timestamps are stored with.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

fn decode_date_opt(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref()
    .map(|s| {
      NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
    })
    .transpose()
}

/// Parse a stored enum wire name.
pub fn decode_enum<T: FromStr>(kind: &str, s: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown {kind}: {s:?}")))
}

fn decode_json_opt(s: Option<String>) -> Result<Option<serde_json::Value>> {
  s.as_deref()
    .map(serde_json::from_str)
    .transpose()
    .map_err(Error::Json)
}

// ─── Users ───────────────────────────────────────────────────────────────────

/// Column list for a `users` row aliased as `u`.
pub const USER_COLUMNS: &str = "u.user_id, u.name, u.avatar_url, u.created_at";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:    String,
  pub name:       String,
  pub avatar_url: Option<String>,
  pub created_at: String,
}

impl RawUser {
  /// Read [`USER_COLUMNS`] starting at column `at`.
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:    row.get(at)?,
      name:       row.get(at + 1)?,
      avatar_url: row.get(at + 2)?,
      created_at: row.get(at + 3)?,
    })
  }

  /// Like [`RawUser::read`], for a LEFT JOIN that may have matched nothing.
  pub fn read_joined(row: &Row<'_>, at: usize) -> rusqlite::Result<Option<Self>> {
    let id: Option<String> = row.get(at)?;
    match id {
      Some(_) => Self::read(row, at).map(Some),
      None => Ok(None),
    }
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:    decode_uuid(&self.user_id)?,
      name:       self.name,
      avatar_url: self.avatar_url,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

fn user_opt(raw: Option<RawUser>) -> Result<Option<User>> { raw.map(RawUser::into_user).transpose() }

// ─── Places ──────────────────────────────────────────────────────────────────

pub const PLACE_COLUMNS: &str =
  "p.place_id, p.name, p.region, p.latitude, p.longitude, p.created_at, p.created_by";

pub struct RawPlace {
  pub place_id:   String,
  pub name:       String,
  pub region:     Option<String>,
  pub latitude:   Option<f64>,
  pub longitude:  Option<f64>,
  pub created_at: String,
  pub created_by: Option<String>,
}

impl RawPlace {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      place_id:   row.get(at)?,
      name:       row.get(at + 1)?,
      region:     row.get(at + 2)?,
      latitude:   row.get(at + 3)?,
      longitude:  row.get(at + 4)?,
      created_at: row.get(at + 5)?,
      created_by: row.get(at + 6)?,
    })
  }

  pub fn into_place(self) -> Result<Place> {
    Ok(Place {
      place_id:   decode_uuid(&self.place_id)?,
      name:       self.name,
      region:     self.region,
      latitude:   self.latitude,
      longitude:  self.longitude,
      created_at: decode_dt(&self.created_at)?,
      created_by: decode_uuid_opt(self.created_by)?,
    })
  }
}

// ─── Route items ─────────────────────────────────────────────────────────────

pub const ROUTE_ITEM_COLUMNS: &str = "r.item_id, r.place_id, r.order_index, r.status, \
   r.start_date, r.end_date, r.notes, r.created_at, r.updated_at";

pub struct RawRouteItem {
  pub item_id:     String,
  pub place_id:    String,
  pub order_index: i64,
  pub status:      String,
  pub start_date:  Option<String>,
  pub end_date:    Option<String>,
  pub notes:       Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawRouteItem {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:     row.get(at)?,
      place_id:    row.get(at + 1)?,
      order_index: row.get(at + 2)?,
      status:      row.get(at + 3)?,
      start_date:  row.get(at + 4)?,
      end_date:    row.get(at + 5)?,
      notes:       row.get(at + 6)?,
      created_at:  row.get(at + 7)?,
      updated_at:  row.get(at + 8)?,
    })
  }

  pub fn into_item(self) -> Result<RouteItem> {
    let order_index = u32::try_from(self.order_index)
      .map_err(|_| Error::Decode(format!("order_index out of range: {}", self.order_index)))?;
    Ok(RouteItem {
      item_id: decode_uuid(&self.item_id)?,
      place_id: decode_uuid(&self.place_id)?,
      order_index,
      status: decode_enum("route status", &self.status)?,
      start_date: decode_date_opt(self.start_date)?,
      end_date: decode_date_opt(self.end_date)?,
      notes: self.notes,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// A route item row joined with its place row.
pub struct RawRouteStop {
  pub item:  RawRouteItem,
  pub place: RawPlace,
}

impl RawRouteStop {
  pub fn into_stop(self) -> Result<RouteStop> {
    Ok(RouteStop { item: self.item.into_item()?, place: self.place.into_place()? })
  }
}

// ─── Suggestions & votes ─────────────────────────────────────────────────────

pub const SUGGESTION_COLUMNS: &str = "s.suggestion_id, s.place_id, s.title, s.description, \
   s.category, s.link, s.cost_estimate, s.created_at, s.created_by";

pub struct RawSuggestion {
  pub suggestion_id: String,
  pub place_id:      String,
  pub title:         String,
  pub description:   Option<String>,
  pub category:      String,
  pub link:          Option<String>,
  pub cost_estimate: Option<String>,
  pub created_at:    String,
  pub created_by:    Option<String>,
}

impl RawSuggestion {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      suggestion_id: row.get(at)?,
      place_id:      row.get(at + 1)?,
      title:         row.get(at + 2)?,
      description:   row.get(at + 3)?,
      category:      row.get(at + 4)?,
      link:          row.get(at + 5)?,
      cost_estimate: row.get(at + 6)?,
      created_at:    row.get(at + 7)?,
      created_by:    row.get(at + 8)?,
    })
  }

  pub fn into_suggestion(self) -> Result<Suggestion> {
    Ok(Suggestion {
      suggestion_id: decode_uuid(&self.suggestion_id)?,
      place_id:      decode_uuid(&self.place_id)?,
      title:         self.title,
      description:   self.description,
      category:      decode_enum("category", &self.category)?,
      link:          self.link,
      cost_estimate: self.cost_estimate,
      created_at:    decode_dt(&self.created_at)?,
      created_by:    decode_uuid_opt(self.created_by)?,
    })
  }
}

pub const VOTE_COLUMNS: &str = "v.vote_id, v.suggestion_id, v.user_id, v.value, v.created_at";

pub struct RawVote {
  pub vote_id:       String,
  pub suggestion_id: String,
  pub user_id:       String,
  pub value:         i64,
  pub created_at:    String,
}

impl RawVote {
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      vote_id:       row.get(0)?,
      suggestion_id: row.get(1)?,
      user_id:       row.get(2)?,
      value:         row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  pub fn into_vote(self) -> Result<Vote> {
    Ok(Vote {
      vote_id:       decode_uuid(&self.vote_id)?,
      suggestion_id: decode_uuid(&self.suggestion_id)?,
      user_id:       decode_uuid(&self.user_id)?,
      value:         VoteValue::try_from(self.value)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// A suggestion row joined with its creator.
pub struct RawScoredSuggestion {
  pub suggestion: RawSuggestion,
  pub creator:    Option<RawUser>,
}

/// Attach each suggestion's votes and compute its score. Suggestion order is
/// preserved.
pub fn assemble_suggestions(
  rows: Vec<RawScoredSuggestion>,
  votes: Vec<RawVote>,
) -> Result<Vec<ScoredSuggestion>> {
  let mut by_suggestion: HashMap<String, Vec<Vote>> = HashMap::new();
  for raw in votes {
    let key = raw.suggestion_id.clone();
    by_suggestion.entry(key).or_default().push(raw.into_vote()?);
  }

  rows
    .into_iter()
    .map(|row| {
      let votes = by_suggestion
        .remove(&row.suggestion.suggestion_id)
        .unwrap_or_default();
      Ok(ScoredSuggestion::new(
        row.suggestion.into_suggestion()?,
        user_opt(row.creator)?,
        votes,
      ))
    })
    .collect()
}

// ─── Todos ───────────────────────────────────────────────────────────────────

pub const TODO_COLUMNS: &str = "t.todo_id, t.title, t.description, t.due_date, t.assignee_id, \
   t.status, t.created_at, t.created_by, t.updated_at, t.updated_by";

pub struct RawTodo {
  pub todo_id:     String,
  pub title:       String,
  pub description: Option<String>,
  pub due_date:    Option<String>,
  pub assignee_id: Option<String>,
  pub status:      String,
  pub created_at:  String,
  pub created_by:  Option<String>,
  pub updated_at:  String,
  pub updated_by:  Option<String>,
}

impl RawTodo {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      todo_id:     row.get(at)?,
      title:       row.get(at + 1)?,
      description: row.get(at + 2)?,
      due_date:    row.get(at + 3)?,
      assignee_id: row.get(at + 4)?,
      status:      row.get(at + 5)?,
      created_at:  row.get(at + 6)?,
      created_by:  row.get(at + 7)?,
      updated_at:  row.get(at + 8)?,
      updated_by:  row.get(at + 9)?,
    })
  }

  pub fn into_todo(self) -> Result<Todo> {
    Ok(Todo {
      todo_id:     decode_uuid(&self.todo_id)?,
      title:       self.title,
      description: self.description,
      due_date:    decode_date_opt(self.due_date)?,
      assignee_id: decode_uuid_opt(self.assignee_id)?,
      status:      decode_enum("todo status", &self.status)?,
      created_at:  decode_dt(&self.created_at)?,
      created_by:  decode_uuid_opt(self.created_by)?,
      updated_at:  decode_dt(&self.updated_at)?,
      updated_by:  decode_uuid_opt(self.updated_by)?,
    })
  }
}

pub struct RawTodoView {
  pub todo:     RawTodo,
  pub assignee: Option<RawUser>,
}

impl RawTodoView {
  pub fn into_view(self) -> Result<TodoView> {
    Ok(TodoView { todo: self.todo.into_todo()?, assignee: user_opt(self.assignee)? })
  }
}

// ─── Audit ───────────────────────────────────────────────────────────────────

pub const AUDIT_COLUMNS: &str = "a.audit_id, a.action_type, a.entity_type, a.entity_id, \
   a.actor_id, a.before_json, a.after_json, a.created_at";

pub struct RawAudit {
  pub audit_id:    String,
  pub action_type: String,
  pub entity_type: String,
  pub entity_id:   String,
  pub actor_id:    Option<String>,
  pub before_json: Option<String>,
  pub after_json:  Option<String>,
  pub created_at:  String,
}

impl RawAudit {
  pub fn read(row: &Row<'_>, at: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      audit_id:    row.get(at)?,
      action_type: row.get(at + 1)?,
      entity_type: row.get(at + 2)?,
      entity_id:   row.get(at + 3)?,
      actor_id:    row.get(at + 4)?,
      before_json: row.get(at + 5)?,
      after_json:  row.get(at + 6)?,
      created_at:  row.get(at + 7)?,
    })
  }

  pub fn into_record(self) -> Result<AuditRecord> {
    Ok(AuditRecord {
      audit_id:    decode_uuid(&self.audit_id)?,
      action:      decode_enum("action type", &self.action_type)?,
      entity_kind: decode_enum("entity type", &self.entity_type)?,
      entity_id:   self.entity_id.parse()?,
      actor_id:    decode_uuid_opt(self.actor_id)?,
      before:      decode_json_opt(self.before_json)?,
      after:       decode_json_opt(self.after_json)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawAuditEntry {
  pub record: RawAudit,
  pub actor:  Option<RawUser>,
}

impl RawAuditEntry {
  pub fn into_entry(self) -> Result<AuditEntry> {
    Ok(AuditEntry { record: self.record.into_record()?, actor: user_opt(self.actor)? })
  }
}
