use chrono::NaiveDate;
use trek_core::{
  route::NewRouteItem,
  store::TripStore,
  suggestion::{NewSuggestion, VoteValue},
  todo::{NewTodo, TodoStatus},
  user::NewUser,
};

use super::Harness;
use crate::{
  export::{PAGE_HEIGHT, TripSnapshot},
  labels::Locale,
};

async fn seeded() -> Harness {
  let h = Harness::new().await;
  let s = &h.store.inner;

  let hanoi = h.place("Hanoi", Some(21.03)).await;
  let hue = h.place("Hue", Some(16.46)).await;
  s.add_route_item(NewRouteItem::new(hanoi.place_id)).await.unwrap();
  s.add_route_item(NewRouteItem::new(hue.place_id)).await.unwrap();

  let voter = s.add_user(NewUser::new("Anna")).await.unwrap();
  for (title, vote) in [
    ("Pho", Some(VoteValue::Up)),
    ("Water puppets", None),
    ("Train street", Some(VoteValue::Down)),
    ("Bia hoi", None),
  ] {
    let sug = s
      .add_suggestion(NewSuggestion::new(hanoi.place_id, title))
      .await
      .unwrap();
    if let Some(v) = vote {
      s.cast_vote(sug.suggestion_id, voter.user_id, v).await.unwrap();
    }
  }

  let mut late = NewTodo::new("Book Hue hotel");
  late.due_date = NaiveDate::from_ymd_opt(2025, 3, 20);
  let mut early = NewTodo::new("Visa");
  early.due_date = NaiveDate::from_ymd_opt(2025, 2, 1);
  s.add_todo(NewTodo::new("Pack adapters")).await.unwrap();
  s.add_todo(late).await.unwrap();
  s.add_todo(early).await.unwrap();
  let done = s.add_todo(NewTodo::new("Flights")).await.unwrap();
  s.set_todo_status(done.todo_id, TodoStatus::Done, None).await.unwrap();
  h
}

#[tokio::test]
async fn snapshot_orders_open_todos_by_due_date() {
  let h = seeded().await;
  let snap = TripSnapshot::fetch(h.store.as_ref()).await.unwrap();

  let titles: Vec<_> = snap.open_todos.iter().map(|v| v.todo.title.as_str()).collect();
  assert_eq!(titles, ["Visa", "Book Hue hotel", "Pack adapters"]);
  assert_eq!(snap.route.len(), 2);
  assert_eq!(snap.users.len(), 1);
}

#[tokio::test]
async fn top_three_per_place_by_score_then_snapshot_order() {
  let h = seeded().await;
  let snap = TripSnapshot::fetch(h.store.as_ref()).await.unwrap();
  let hanoi = snap.route[0].place.place_id;

  let top: Vec<_> = snap
    .top_for(hanoi)
    .iter()
    .map(|s| s.suggestion.title.as_str())
    .collect();
  // Newest first among the zero scores: "Bia hoi" then "Water puppets".
  assert_eq!(top, ["Pho", "Bia hoi", "Water puppets"]);
  assert!(snap.top_for(snap.route[1].place.place_id).is_empty());
}

#[tokio::test]
async fn every_page_carries_a_footer() {
  let h = seeded().await;
  let doc = h.session.export().await.unwrap();
  let n = doc.page_count();
  assert!(n >= 2, "title page plus content");

  for i in 0..n {
    let page = doc.page(i).unwrap();
    assert!(page.trim_end().ends_with(&format!("Page {} of {n}", i + 1)));
    assert_eq!(page.lines().count(), PAGE_HEIGHT + 2);
  }
  assert!(doc.page(n).is_none());

  let text = doc.to_text();
  assert_eq!(text.matches('\x0c').count(), n - 1);
  assert!(text.contains("ROUTE"));
  assert!(text.contains("TOP SUGGESTIONS PER PLACE"));
  assert!(text.contains("OPEN TO-DOS"));
  assert!(!text.contains("Flights"));
}

#[tokio::test]
async fn german_render_uses_german_footer() {
  let h = seeded().await;
  let snap = TripSnapshot::fetch(h.store.as_ref()).await.unwrap();
  let doc = snap.render(Locale::De);
  assert!(doc.page(0).unwrap().contains(&format!("Seite 1 von {}", doc.page_count())));
  assert!(doc.to_text().contains("OFFENE TODOS"));
}

#[tokio::test]
async fn write_to_names_file_by_date() {
  let h = seeded().await;
  let doc = h.session.export().await.unwrap();
  let dir = std::env::temp_dir().join(format!("trek-export-{}", uuid::Uuid::new_v4()));

  let path = doc.write_to(&dir).unwrap();
  assert_eq!(
    path.file_name().unwrap().to_string_lossy(),
    format!("trek-{}.txt", doc.date.format("%Y-%m-%d"))
  );
  assert_eq!(std::fs::read_to_string(&path).unwrap(), doc.to_text());
  let _ = std::fs::remove_dir_all(dir);
}
