//! Read-only activity log: the most recent audit records, newest first.

use std::{collections::HashSet, sync::Arc};

use chrono::{DateTime, Utc};
use trek_core::{audit::AuditEntry, store::TripStore};
use uuid::Uuid;

use crate::{Error, Result, labels::Locale};

/// How many records the log shows. There is no paging past this.
pub const LOG_LIMIT: usize = 100;

/// One rendered log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
  pub audit_id:   Uuid,
  pub actor:      String,
  pub action:     &'static str,
  pub entity:     &'static str,
  pub when:       String,
  pub expandable: bool,
  pub expanded:   bool,
}

/// Pretty-printed snapshots for an expanded row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panes {
  pub before: Option<String>,
  pub after:  Option<String>,
}

pub struct LogView<S> {
  store:    Arc<S>,
  locale:   Locale,
  entries:  Vec<AuditEntry>,
  expanded: HashSet<Uuid>,
}

impl<S: TripStore> LogView<S> {
  pub fn new(store: Arc<S>, locale: Locale) -> Self {
    Self { store, locale, entries: Vec::new(), expanded: HashSet::new() }
  }

  pub async fn load(&mut self) -> Result<()> {
    self.entries = self.store.list_audit(LOG_LIMIT).await.map_err(Error::backend)?;
    let present: HashSet<_> = self.entries.iter().map(|e| e.record.audit_id).collect();
    self.expanded.retain(|id| present.contains(id));
    Ok(())
  }

  pub fn entries(&self) -> &[AuditEntry] { &self.entries }

  /// Expand or collapse one row; rows toggle independently.
  pub fn toggle(&mut self, audit_id: Uuid) -> bool {
    if !self.expanded.remove(&audit_id) {
      self.expanded.insert(audit_id);
      return true;
    }
    false
  }

  pub fn is_expanded(&self, audit_id: Uuid) -> bool { self.expanded.contains(&audit_id) }

  pub fn rows(&self, now: DateTime<Utc>) -> Vec<LogRow> {
    self
      .entries
      .iter()
      .map(|entry| {
        let record = &entry.record;
        LogRow {
          audit_id:   record.audit_id,
          actor:      entry
            .actor
            .as_ref()
            .map_or_else(|| self.locale.unknown_actor().to_owned(), |u| u.name.clone()),
          action:     self.locale.action(record.action),
          entity:     self.locale.entity(record.entity_kind),
          when:       self.locale.relative_time(record.created_at, now),
          expandable: record.before.is_some() || record.after.is_some(),
          expanded:   self.is_expanded(record.audit_id),
        }
      })
      .collect()
  }

  pub fn panes(&self, audit_id: Uuid) -> Option<Panes> {
    let record = &self
      .entries
      .iter()
      .find(|e| e.record.audit_id == audit_id)?
      .record;
    let pretty = |v: &serde_json::Value| {
      serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
    };
    Some(Panes {
      before: record.before.as_ref().map(pretty),
      after:  record.after.as_ref().map(pretty),
    })
  }
}
