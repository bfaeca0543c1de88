//! Shared to-dos.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, Result, user::User};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TodoStatus {
  #[default]
  Open,
  Done,
}

impl TodoStatus {
  pub fn toggled(self) -> Self {
    match self {
      Self::Open => Self::Done,
      Self::Done => Self::Open,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
  pub todo_id:     Uuid,
  pub title:       String,
  pub description: Option<String>,
  pub due_date:    Option<NaiveDate>,
  pub assignee_id: Option<Uuid>,
  pub status:      TodoStatus,
  pub created_at:  DateTime<Utc>,
  pub created_by:  Option<Uuid>,
  pub updated_at:  DateTime<Utc>,
  pub updated_by:  Option<Uuid>,
}

/// A to-do joined with its assignee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodoView {
  pub todo:     Todo,
  pub assignee: Option<User>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTodo {
  pub title:       String,
  pub description: Option<String>,
  pub due_date:    Option<NaiveDate>,
  pub assignee_id: Option<Uuid>,
  pub created_by:  Option<Uuid>,
}

impl NewTodo {
  pub fn new(title: impl Into<String>) -> Self {
    Self { title: title.into(), ..Self::default() }
  }

  pub fn validate(self) -> Result<Self> {
    let title = crate::trimmed(&self.title).ok_or(Error::EmptyTitle)?;
    let description = self.description.as_deref().and_then(crate::trimmed);
    Ok(Self { title, description, ..self })
  }
}

// ─── Filtering ───────────────────────────────────────────────────────────────

/// Which statuses a to-do list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
  All,
  #[default]
  Open,
  Done,
}

impl StatusFilter {
  pub fn next(self) -> Self {
    match self {
      Self::All => Self::Open,
      Self::Open => Self::Done,
      Self::Done => Self::All,
    }
  }

  pub fn admits(self, status: TodoStatus) -> bool {
    match self {
      Self::All => true,
      Self::Open => status == TodoStatus::Open,
      Self::Done => status == TodoStatus::Done,
    }
  }
}

/// Client-side to-do filter. `assignee: None` means any assignee (including
/// unassigned).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodoFilter {
  pub status:   StatusFilter,
  pub assignee: Option<Uuid>,
}

impl TodoFilter {
  pub fn matches(&self, todo: &Todo) -> bool {
    self.status.admits(todo.status)
      && self.assignee.is_none_or(|a| todo.assignee_id == Some(a))
  }
}
