//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::NaiveDate;
use serde_json::json;
use trek_core::{
  audit::{ActionKind, EntityKind, EntityRef, NewAuditRecord},
  place::NewPlace,
  route::{NewRouteItem, RouteItemUpdate, RouteStatus},
  store::TripStore,
  suggestion::{NewSuggestion, VoteTransition, VoteValue},
  todo::{NewTodo, TodoStatus},
  user::NewUser,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn place(s: &SqliteStore, name: &str) -> Uuid {
  s.add_place(NewPlace::new(name)).await.unwrap().place_id
}

async fn user(s: &SqliteStore, name: &str) -> Uuid {
  s.add_user(NewUser::new(name)).await.unwrap().user_id
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn users_are_listed_by_name() {
  let s = store().await;
  user(&s, "Minh").await;
  user(&s, "Anna").await;
  user(&s, "Lukas").await;

  let names: Vec<_> = s
    .list_users()
    .await
    .unwrap()
    .into_iter()
    .map(|u| u.name)
    .collect();
  assert_eq!(names, ["Anna", "Lukas", "Minh"]);
}

#[tokio::test]
async fn blank_user_name_is_rejected() {
  let s = store().await;
  let err = s.add_user(NewUser::new("   ")).await.unwrap_err();
  assert!(matches!(err, Error::Core(trek_core::Error::EmptyName)));
}

#[tokio::test]
async fn rename_user_trims_and_persists() {
  let s = store().await;
  let id = user(&s, "Anna").await;

  let renamed = s.rename_user(id, "  Anna B.  ".into()).await.unwrap();
  assert_eq!(renamed.name, "Anna B.");
  assert_eq!(s.get_user(id).await.unwrap().unwrap().name, "Anna B.");
}

#[tokio::test]
async fn rename_missing_user_fails() {
  let s = store().await;
  let missing = Uuid::new_v4();
  let err = s.rename_user(missing, "Ghost".into()).await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(id) if id == missing));
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Places & route ──────────────────────────────────────────────────────────

#[tokio::test]
async fn place_round_trips_coordinates() {
  let s = store().await;
  let mut input = NewPlace::new(" Hanoi ");
  input.region = Some("North".into());
  input.latitude = Some(21.03);
  input.longitude = Some(105.85);
  let created = s.add_place(input).await.unwrap();
  assert_eq!(created.name, "Hanoi");

  let fetched = s.get_place(created.place_id).await.unwrap().unwrap();
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn route_items_append_at_next_index() {
  let s = store().await;
  let hanoi = place(&s, "Hanoi").await;
  let hue = place(&s, "Hue").await;

  let a = s.add_route_item(NewRouteItem::new(hanoi)).await.unwrap();
  let b = s.add_route_item(NewRouteItem::new(hue)).await.unwrap();
  assert_eq!(a.order_index, 1);
  assert_eq!(b.order_index, 2);

  s.set_order_index(a.item_id, 7).await.unwrap();
  let c = s.add_route_item(NewRouteItem::new(hanoi)).await.unwrap();
  assert_eq!(c.order_index, 8);
}

#[tokio::test]
async fn route_is_listed_in_order_with_places() {
  let s = store().await;
  let hanoi = place(&s, "Hanoi").await;
  let hue = place(&s, "Hue").await;
  let a = s.add_route_item(NewRouteItem::new(hanoi)).await.unwrap();
  let b = s.add_route_item(NewRouteItem::new(hue)).await.unwrap();

  s.set_order_index(a.item_id, 2).await.unwrap();
  s.set_order_index(b.item_id, 1).await.unwrap();

  let route = s.list_route().await.unwrap();
  let names: Vec<_> = route.iter().map(|stop| stop.place.name.as_str()).collect();
  assert_eq!(names, ["Hue", "Hanoi"]);
  assert_eq!(route[0].item.order_index, 1);
}

#[tokio::test]
async fn appended_notes_are_trimmed() {
  let s = store().await;
  let hue = place(&s, "Hue").await;

  let input = NewRouteItem { notes: Some("  citadel first ".into()), ..NewRouteItem::new(hue) };
  let item = s.add_route_item(input).await.unwrap();
  assert_eq!(item.notes.as_deref(), Some("citadel first"));

  let input = NewRouteItem { notes: Some("   ".into()), ..NewRouteItem::new(hue) };
  let item = s.add_route_item(input).await.unwrap();
  assert_eq!(item.notes, None);

  let stops = s.list_route().await.unwrap();
  assert_eq!(stops[0].item.notes.as_deref(), Some("citadel first"));
  assert_eq!(stops[1].item.notes, None);
}

#[tokio::test]
async fn route_item_for_unknown_place_fails() {
  let s = store().await;
  let missing = Uuid::new_v4();
  let err = s.add_route_item(NewRouteItem::new(missing)).await.unwrap_err();
  assert!(matches!(err, Error::PlaceNotFound(id) if id == missing));
}

#[tokio::test]
async fn update_route_item_replaces_editable_fields() {
  let s = store().await;
  let hanoi = place(&s, "Hanoi").await;
  let item = s.add_route_item(NewRouteItem::new(hanoi)).await.unwrap();

  let update = RouteItemUpdate {
    status:     RouteStatus::InProgress,
    start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
    end_date:   NaiveDate::from_ymd_opt(2025, 3, 4),
    notes:      Some("  ".into()),
  };
  let updated = s.update_route_item(item.item_id, update).await.unwrap();
  assert_eq!(updated.status, RouteStatus::InProgress);
  assert_eq!(updated.end_date, NaiveDate::from_ymd_opt(2025, 3, 4));
  assert_eq!(updated.notes, None);
  assert_eq!(updated.order_index, item.order_index);
}

#[tokio::test]
async fn set_order_index_on_missing_item_fails() {
  let s = store().await;
  let err = s.set_order_index(Uuid::new_v4(), 1).await.unwrap_err();
  assert!(matches!(err, Error::RouteItemNotFound(_)));
}

// ─── Suggestions & votes ─────────────────────────────────────────────────────

#[tokio::test]
async fn invalid_link_is_rejected() {
  let s = store().await;
  let hanoi = place(&s, "Hanoi").await;
  let mut input = NewSuggestion::new(hanoi, "Water puppets");
  input.link = Some("ftp://example.com".into());
  let err = s.add_suggestion(input).await.unwrap_err();
  assert!(matches!(err, Error::Core(trek_core::Error::InvalidLink(_))));
}

#[tokio::test]
async fn votes_toggle_retract_and_change() {
  let s = store().await;
  let hanoi = place(&s, "Hanoi").await;
  let anna = user(&s, "Anna").await;
  let sug = s
    .add_suggestion(NewSuggestion::new(hanoi, "Street food tour"))
    .await
    .unwrap();
  let id = sug.suggestion_id;

  let t = s.cast_vote(id, anna, VoteValue::Up).await.unwrap();
  assert_eq!(t, VoteTransition::Cast { value: VoteValue::Up });

  let t = s.cast_vote(id, anna, VoteValue::Up).await.unwrap();
  assert_eq!(t, VoteTransition::Retract { previous: VoteValue::Up });
  assert_eq!(s.list_suggestions(Some(hanoi)).await.unwrap()[0].score, 0);

  s.cast_vote(id, anna, VoteValue::Up).await.unwrap();
  let t = s.cast_vote(id, anna, VoteValue::Down).await.unwrap();
  assert_eq!(t, VoteTransition::Change { previous: VoteValue::Up, value: VoteValue::Down });

  let listed = s.list_suggestions(Some(hanoi)).await.unwrap();
  assert_eq!(listed[0].votes.len(), 1);
  assert_eq!(listed[0].score, -1);
  assert_eq!(listed[0].vote_of(anna), Some(VoteValue::Down));
}

#[tokio::test]
async fn score_is_sum_of_votes() {
  let s = store().await;
  let hanoi = place(&s, "Hanoi").await;
  let tour = s
    .add_suggestion(NewSuggestion::new(hanoi, "Street food tour"))
    .await
    .unwrap();
  let museum = s
    .add_suggestion(NewSuggestion::new(hanoi, "Museum"))
    .await
    .unwrap();

  for (name, value) in [("a", VoteValue::Up), ("b", VoteValue::Up), ("c", VoteValue::Down)] {
    let u = user(&s, name).await;
    s.cast_vote(tour.suggestion_id, u, value).await.unwrap();
  }

  let listed = s.list_suggestions(Some(hanoi)).await.unwrap();
  // newest first
  assert_eq!(listed[0].id(), museum.suggestion_id);
  assert_eq!(listed[0].score, 0);
  assert_eq!(listed[1].score, 1);
}

#[tokio::test]
async fn suggestions_filter_by_place_and_join_creator() {
  let s = store().await;
  let hanoi = place(&s, "Hanoi").await;
  let hue = place(&s, "Hue").await;
  let anna = user(&s, "Anna").await;

  let mut input = NewSuggestion::new(hanoi, "Pho");
  input.created_by = Some(anna);
  s.add_suggestion(input).await.unwrap();
  s.add_suggestion(NewSuggestion::new(hue, "Citadel")).await.unwrap();

  let at_hanoi = s.list_suggestions(Some(hanoi)).await.unwrap();
  assert_eq!(at_hanoi.len(), 1);
  assert_eq!(at_hanoi[0].creator.as_ref().map(|u| u.name.as_str()), Some("Anna"));
  assert_eq!(s.list_suggestions(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn vote_on_missing_suggestion_fails() {
  let s = store().await;
  let anna = user(&s, "Anna").await;
  let err = s
    .cast_vote(Uuid::new_v4(), anna, VoteValue::Up)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::SuggestionNotFound(_)));
}

#[tokio::test]
async fn vote_by_unknown_user_fails() {
  let s = store().await;
  let hanoi = place(&s, "Hanoi").await;
  let sug = s.add_suggestion(NewSuggestion::new(hanoi, "Pho")).await.unwrap();
  let ghost = Uuid::new_v4();
  let err = s
    .cast_vote(sug.suggestion_id, ghost, VoteValue::Up)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UserNotFound(id) if id == ghost));
}

// ─── Todos ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn todo_status_and_assignee_updates() {
  let s = store().await;
  let anna = user(&s, "Anna").await;
  let todo = s.add_todo(NewTodo::new("Book train")).await.unwrap();
  assert_eq!(todo.status, TodoStatus::Open);

  let done = s
    .set_todo_status(todo.todo_id, TodoStatus::Done, Some(anna))
    .await
    .unwrap();
  assert_eq!(done.status, TodoStatus::Done);
  assert_eq!(done.updated_by, Some(anna));
  assert!(done.updated_at >= todo.updated_at);

  let assigned = s
    .set_todo_assignee(todo.todo_id, Some(anna), Some(anna))
    .await
    .unwrap();
  assert_eq!(assigned.assignee_id, Some(anna));

  let views = s.list_todos(None).await.unwrap();
  assert_eq!(views[0].assignee.as_ref().map(|u| u.user_id), Some(anna));
}

#[tokio::test]
async fn todos_filter_by_status_newest_first() {
  let s = store().await;
  let a = s.add_todo(NewTodo::new("Visa")).await.unwrap();
  let b = s.add_todo(NewTodo::new("Insurance")).await.unwrap();
  let c = s.add_todo(NewTodo::new("SIM card")).await.unwrap();
  s.set_todo_status(b.todo_id, TodoStatus::Done, None).await.unwrap();

  let open: Vec<_> = s
    .list_todos(Some(TodoStatus::Open))
    .await
    .unwrap()
    .into_iter()
    .map(|v| v.todo.todo_id)
    .collect();
  assert_eq!(open, [c.todo_id, a.todo_id]);
  assert_eq!(s.list_todos(Some(TodoStatus::Done)).await.unwrap().len(), 1);
}

#[tokio::test]
async fn assigning_unknown_user_fails() {
  let s = store().await;
  let todo = s.add_todo(NewTodo::new("Visa")).await.unwrap();
  let ghost = Uuid::new_v4();
  let err = s
    .set_todo_assignee(todo.todo_id, Some(ghost), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UserNotFound(id) if id == ghost));
}

#[tokio::test]
async fn updating_missing_todo_fails() {
  let s = store().await;
  let err = s
    .set_todo_status(Uuid::new_v4(), TodoStatus::Done, None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::TodoNotFound(_)));
}

// ─── Audit ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn audit_is_listed_newest_first_with_actor() {
  let s = store().await;
  let anna = user(&s, "Anna").await;
  let item = Uuid::new_v4();

  s.append_audit(
    NewAuditRecord::new(ActionKind::Create, EntityKind::Todo, item)
      .actor(Some(anna))
      .after(Some(json!({ "title": "Visa" }))),
  )
  .await
  .unwrap();
  s.append_audit(
    NewAuditRecord::new(ActionKind::Reorder, EntityKind::RouteItem, EntityRef::AutoRoute)
      .actor(Some(Uuid::new_v4())),
  )
  .await
  .unwrap();

  let entries = s.list_audit(100).await.unwrap();
  assert_eq!(entries.len(), 2);

  assert_eq!(entries[0].record.entity_id, EntityRef::AutoRoute);
  assert!(entries[0].actor.is_none());

  assert_eq!(entries[1].record.entity_id, EntityRef::Row(item));
  assert_eq!(entries[1].actor.as_ref().map(|u| u.name.as_str()), Some("Anna"));
  assert_eq!(entries[1].record.after, Some(json!({ "title": "Visa" })));
  assert_eq!(entries[1].record.before, None);
}

#[tokio::test]
async fn audit_list_respects_limit() {
  let s = store().await;
  for _ in 0..5 {
    s.append_audit(NewAuditRecord::new(ActionKind::Update, EntityKind::Place, Uuid::new_v4()))
      .await
      .unwrap();
  }
  assert_eq!(s.list_audit(3).await.unwrap().len(), 3);
}
