use chrono::NaiveDate;
use serde_json::json;
use trek_core::{
  audit::{ActionKind, EntityKind, EntityRef},
  todo::{StatusFilter, TodoFilter, TodoStatus},
};

use super::{Harness, Op};
use crate::Error;

#[tokio::test]
async fn each_todo_mutation_writes_one_record() {
  let h = Harness::new().await;
  let anna = h.login("Anna").await;
  let mut view = h.session.todos();
  view.load().await.unwrap();

  let todo = view
    .add("  Book sleeper train ", NaiveDate::from_ymd_opt(2025, 3, 2))
    .await
    .unwrap();
  assert_eq!(todo.title, "Book sleeper train");
  assert_eq!(todo.created_by, Some(anna.user_id));

  let done = view.toggle(todo.todo_id).await.unwrap();
  assert_eq!(done.status, TodoStatus::Done);
  assert_eq!(done.updated_by, Some(anna.user_id));

  let assigned = view.assign(todo.todo_id, Some(anna.user_id)).await.unwrap();
  assert_eq!(assigned.assignee_id, Some(anna.user_id));

  let log = h.audit_log().await;
  assert_eq!(log.len(), 3);
  assert!(log.iter().all(|r| r.entity_kind == EntityKind::Todo));
  assert!(log.iter().all(|r| r.entity_id == EntityRef::Row(todo.todo_id)));
  assert!(log.iter().all(|r| r.actor_id == Some(anna.user_id)));
  assert_eq!(
    log.iter().map(|r| r.action).collect::<Vec<_>>(),
    [ActionKind::Create, ActionKind::Update, ActionKind::Update]
  );
  assert_eq!(log[1].before, Some(json!({ "status": "open" })));
  assert_eq!(log[1].after, Some(json!({ "status": "done" })));
  assert_eq!(log[2].before, Some(json!({ "assignee_id": null })));
  assert_eq!(log[2].after, Some(json!({ "assignee_id": anna.user_id })));
}

#[tokio::test]
async fn blank_title_is_rejected() {
  let h = Harness::new().await;
  let mut view = h.session.todos();
  let err = view.add("   ", None).await.unwrap_err();
  assert!(matches!(err, Error::Validation(trek_core::Error::EmptyTitle)));
  assert_eq!(h.store.calls(Op::AddTodo), 0);
}

#[tokio::test]
async fn failed_toggle_writes_no_record_and_keeps_optimistic_state() {
  let h = Harness::new().await;
  let mut view = h.session.todos();
  let todo = view.add("Visa", None).await.unwrap();
  h.audit_log().await;
  h.store.fail(Op::SetTodoStatus);

  let err = view.toggle(todo.todo_id).await.unwrap_err();
  assert!(matches!(err, Error::Backend(_)));
  assert_eq!(h.audit_log().await.len(), 1);

  // Not rolled back; the next load reconciles.
  assert_eq!(view.todos()[0].todo.status, TodoStatus::Done);
  view.load().await.unwrap();
  assert_eq!(view.todos()[0].todo.status, TodoStatus::Open);
}

#[tokio::test]
async fn visible_applies_status_and_assignee_filters() {
  let h = Harness::new().await;
  let anna = h.login("Anna").await;
  let mut view = h.session.todos();
  let visa = view.add("Visa", None).await.unwrap();
  let sim = view.add("SIM card", None).await.unwrap();
  view.add("Pack bag", None).await.unwrap();
  view.toggle(visa.todo_id).await.unwrap();
  view.assign(sim.todo_id, Some(anna.user_id)).await.unwrap();

  let titles = |filter: TodoFilter| {
    view
      .visible(&filter)
      .iter()
      .map(|v| v.todo.title.clone())
      .collect::<Vec<_>>()
  };

  assert_eq!(titles(TodoFilter::default()), ["Pack bag", "SIM card"]);
  assert_eq!(
    titles(TodoFilter { status: StatusFilter::All, assignee: None }),
    ["Pack bag", "SIM card", "Visa"]
  );
  assert_eq!(
    titles(TodoFilter { status: StatusFilter::Done, assignee: None }),
    ["Visa"]
  );
  assert_eq!(
    titles(TodoFilter { status: StatusFilter::Open, assignee: Some(anna.user_id) }),
    ["SIM card"]
  );
}

#[tokio::test]
async fn unknown_todo_is_not_found() {
  let h = Harness::new().await;
  let mut view = h.session.todos();
  view.load().await.unwrap();
  let err = view.toggle(uuid::Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { kind: "todo", .. }));
}
