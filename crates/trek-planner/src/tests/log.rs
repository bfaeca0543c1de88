use chrono::Utc;
use serde_json::json;
use trek_core::{
  audit::{ActionKind, EntityKind, NewAuditRecord},
  store::TripStore,
};
use uuid::Uuid;

use super::Harness;
use crate::{labels::Locale, log::LogView};

#[tokio::test]
async fn rows_resolve_actor_or_fall_back_to_unknown() {
  let h = Harness::new().await;
  let anna = h.login("Anna").await;
  let audit = h.session.audit();

  audit.record(
    NewAuditRecord::new(ActionKind::Create, EntityKind::Todo, Uuid::new_v4())
      .after(Some(json!({ "title": "Visa" }))),
  );
  h.session.identity().clear().unwrap();
  audit.record(NewAuditRecord::new(ActionKind::Reorder, EntityKind::RouteItem, Uuid::new_v4()));
  h.audit_log().await;

  let mut view = LogView::new(h.store.clone(), Locale::De);
  view.load().await.unwrap();
  let rows = view.rows(Utc::now());

  assert_eq!(rows.len(), 2);
  assert_eq!(rows[0].actor, "Unbekannt");
  assert_eq!(rows[0].action, "hat verschoben");
  assert_eq!(rows[0].entity, "Route");
  assert!(!rows[0].expandable);

  assert_eq!(rows[1].actor, anna.name);
  assert_eq!(rows[1].action, "hat erstellt");
  assert_eq!(rows[1].entity, "ToDo");
  assert_eq!(rows[1].when, "gerade eben");
  assert!(rows[1].expandable);
}

#[tokio::test]
async fn rows_expand_independently_with_pretty_panes() {
  let h = Harness::new().await;
  for title in ["Visa", "SIM"] {
    h.session.audit().record(
      NewAuditRecord::new(ActionKind::Update, EntityKind::Todo, Uuid::new_v4())
        .before(Some(json!({ "title": "old" })))
        .after(Some(json!({ "title": title }))),
    );
  }
  h.audit_log().await;

  let mut view = h.session.log();
  view.load().await.unwrap();
  let ids: Vec<_> = view.entries().iter().map(|e| e.record.audit_id).collect();

  assert!(view.toggle(ids[0]));
  assert!(view.toggle(ids[1]));
  assert!(!view.toggle(ids[0]));
  assert!(!view.is_expanded(ids[0]));
  assert!(view.is_expanded(ids[1]));

  let panes = view.panes(ids[1]).unwrap();
  assert_eq!(panes.before.as_deref(), Some("{\n  \"title\": \"old\"\n}"));
  assert_eq!(panes.after.as_deref(), Some("{\n  \"title\": \"Visa\"\n}"));
}

#[tokio::test]
async fn log_is_capped_at_one_hundred_rows() {
  let h = Harness::new().await;
  for _ in 0..105 {
    h.store
      .inner
      .append_audit(NewAuditRecord::new(ActionKind::Create, EntityKind::Place, Uuid::new_v4()))
      .await
      .unwrap();
  }
  let mut view = h.session.log();
  view.load().await.unwrap();
  assert_eq!(view.entries().len(), crate::log::LOG_LIMIT);
}
