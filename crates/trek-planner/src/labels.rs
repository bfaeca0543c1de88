//! Display strings for the two supported interface languages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use trek_core::{
  audit::{ActionKind, EntityKind},
  route::RouteStatus,
  suggestion::Category,
  todo::{StatusFilter, TodoStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
  #[default]
  En,
  De,
}

impl std::str::FromStr for Locale {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "en" => Ok(Self::En),
      "de" => Ok(Self::De),
      other => Err(format!("unsupported locale: {other:?}")),
    }
  }
}

impl Locale {
  pub fn pick(self, en: &'static str, de: &'static str) -> &'static str {
    match self {
      Self::En => en,
      Self::De => de,
    }
  }

  /// Verb phrase shown after the actor's name.
  pub fn action(self, action: ActionKind) -> &'static str {
    match action {
      ActionKind::Create => self.pick("created", "hat erstellt"),
      ActionKind::Update => self.pick("updated", "hat aktualisiert"),
      ActionKind::Delete => self.pick("deleted", "hat gelöscht"),
      ActionKind::Reorder => self.pick("reordered", "hat verschoben"),
    }
  }

  pub fn entity(self, kind: EntityKind) -> &'static str {
    match kind {
      EntityKind::RouteItem => "Route",
      EntityKind::Suggestion => self.pick("Suggestion", "Vorschlag"),
      EntityKind::Vote => "Vote",
      EntityKind::Todo => self.pick("To-do", "ToDo"),
      EntityKind::Place => self.pick("Place", "Ort"),
      EntityKind::User => self.pick("User", "Benutzer"),
    }
  }

  pub fn unknown_actor(self) -> &'static str { self.pick("unknown", "Unbekannt") }

  pub fn route_status(self, status: RouteStatus) -> &'static str {
    match status {
      RouteStatus::Planned => self.pick("Planned", "Geplant"),
      RouteStatus::InProgress => self.pick("In progress", "Unterwegs"),
      RouteStatus::Completed => self.pick("Completed", "Erledigt"),
      RouteStatus::Skipped => self.pick("Skipped", "Übersprungen"),
    }
  }

  pub fn todo_status(self, status: TodoStatus) -> &'static str {
    match status {
      TodoStatus::Open => self.pick("Open", "Offen"),
      TodoStatus::Done => self.pick("Done", "Erledigt"),
    }
  }

  pub fn status_filter(self, filter: StatusFilter) -> &'static str {
    match filter {
      StatusFilter::All => self.pick("All", "Alle"),
      StatusFilter::Open => self.pick("Open", "Offen"),
      StatusFilter::Done => self.pick("Done", "Erledigt"),
    }
  }

  pub fn category(self, category: Category) -> &'static str {
    match category {
      Category::Activity => self.pick("Activity", "Aktivität"),
      Category::Food => self.pick("Food", "Essen"),
      Category::Hotel => "Hotel",
      Category::Transport => "Transport",
      Category::Other => self.pick("Other", "Sonstiges"),
    }
  }

  /// Coarse "time ago" text for `at`, relative to `now`.
  pub fn relative_time(self, at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds().max(0);
    let (n, en, de) = match secs {
      0..=59 => return self.pick("just now", "gerade eben").to_owned(),
      60..=3_599 => (secs / 60, "min", "Min."),
      3_600..=86_399 => (secs / 3_600, "h", "Std."),
      _ => (secs / 86_400, "d", "Tg."),
    };
    match self {
      Self::En => format!("{n} {en} ago"),
      Self::De => format!("vor {n} {de}"),
    }
  }

  /// Calendar date in the locale's usual order.
  pub fn date(self, date: chrono::NaiveDate) -> String {
    match self {
      Self::En => date.format("%Y-%m-%d").to_string(),
      Self::De => date.format("%d.%m.%Y").to_string(),
    }
  }
}
