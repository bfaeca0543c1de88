//! Planner tests against an in-memory SQLite store wrapped in [`FaultyStore`],
//! which records every call and can be told to fail chosen operations.

mod export;
mod log;
mod todos;

use std::{
  collections::HashSet,
  sync::{Arc, Mutex},
};

use trek_core::{
  audit::{AuditEntry, AuditRecord, NewAuditRecord},
  place::{NewPlace, Place},
  route::{NewRouteItem, RouteItem, RouteItemUpdate, RouteStop},
  store::TripStore,
  suggestion::{NewSuggestion, ScoredSuggestion, Suggestion, VoteTransition, VoteValue},
  todo::{NewTodo, Todo, TodoStatus, TodoView},
  user::{NewUser, User},
};
use trek_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{Session, labels::Locale, storage::MemoryStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
  AddUser,
  GetUser,
  ListUsers,
  RenameUser,
  AddPlace,
  GetPlace,
  ListPlaces,
  AddRouteItem,
  ListRoute,
  UpdateRouteItem,
  SetOrderIndex,
  AddSuggestion,
  ListSuggestions,
  CastVote,
  AddTodo,
  ListTodos,
  SetTodoStatus,
  SetTodoAssignee,
  AppendAudit,
  ListAudit,
}

#[derive(Debug, thiserror::Error)]
pub enum TestError {
  #[error("injected failure: {0:?}")]
  Injected(Op),

  #[error(transparent)]
  Store(#[from] trek_store_sqlite::Error),
}

pub struct FaultyStore {
  pub inner:     SqliteStore,
  calls:         Mutex<Vec<Op>>,
  failing:       Mutex<HashSet<Op>>,
  /// Route items whose `set_order_index` fails.
  failing_items: Mutex<HashSet<Uuid>>,
}

impl FaultyStore {
  pub async fn new() -> Self {
    Self {
      inner:         SqliteStore::open_in_memory().await.expect("in-memory store"),
      calls:         Mutex::default(),
      failing:       Mutex::default(),
      failing_items: Mutex::default(),
    }
  }

  pub fn fail(&self, op: Op) { self.failing.lock().unwrap().insert(op); }

  pub fn heal(&self, op: Op) { self.failing.lock().unwrap().remove(&op); }

  pub fn fail_order_write(&self, item: Uuid) { self.failing_items.lock().unwrap().insert(item); }

  pub fn calls(&self, op: Op) -> usize {
    self.calls.lock().unwrap().iter().filter(|&&c| c == op).count()
  }

  pub fn reset_calls(&self) { self.calls.lock().unwrap().clear(); }

  fn enter(&self, op: Op) -> Result<(), TestError> {
    self.calls.lock().unwrap().push(op);
    if self.failing.lock().unwrap().contains(&op) {
      return Err(TestError::Injected(op));
    }
    Ok(())
  }
}

impl TripStore for FaultyStore {
  type Error = TestError;

  async fn add_user(&self, input: NewUser) -> Result<User, TestError> {
    self.enter(Op::AddUser)?;
    Ok(self.inner.add_user(input).await?)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>, TestError> {
    self.enter(Op::GetUser)?;
    Ok(self.inner.get_user(id).await?)
  }

  async fn list_users(&self) -> Result<Vec<User>, TestError> {
    self.enter(Op::ListUsers)?;
    Ok(self.inner.list_users().await?)
  }

  async fn rename_user(&self, id: Uuid, name: String) -> Result<User, TestError> {
    self.enter(Op::RenameUser)?;
    Ok(self.inner.rename_user(id, name).await?)
  }

  async fn add_place(&self, input: NewPlace) -> Result<Place, TestError> {
    self.enter(Op::AddPlace)?;
    Ok(self.inner.add_place(input).await?)
  }

  async fn get_place(&self, id: Uuid) -> Result<Option<Place>, TestError> {
    self.enter(Op::GetPlace)?;
    Ok(self.inner.get_place(id).await?)
  }

  async fn list_places(&self) -> Result<Vec<Place>, TestError> {
    self.enter(Op::ListPlaces)?;
    Ok(self.inner.list_places().await?)
  }

  async fn add_route_item(&self, input: NewRouteItem) -> Result<RouteItem, TestError> {
    self.enter(Op::AddRouteItem)?;
    Ok(self.inner.add_route_item(input).await?)
  }

  async fn list_route(&self) -> Result<Vec<RouteStop>, TestError> {
    self.enter(Op::ListRoute)?;
    Ok(self.inner.list_route().await?)
  }

  async fn update_route_item(
    &self,
    id: Uuid,
    update: RouteItemUpdate,
  ) -> Result<RouteItem, TestError> {
    self.enter(Op::UpdateRouteItem)?;
    Ok(self.inner.update_route_item(id, update).await?)
  }

  async fn set_order_index(&self, id: Uuid, order_index: u32) -> Result<(), TestError> {
    self.enter(Op::SetOrderIndex)?;
    if self.failing_items.lock().unwrap().contains(&id) {
      return Err(TestError::Injected(Op::SetOrderIndex));
    }
    Ok(self.inner.set_order_index(id, order_index).await?)
  }

  async fn add_suggestion(&self, input: NewSuggestion) -> Result<Suggestion, TestError> {
    self.enter(Op::AddSuggestion)?;
    Ok(self.inner.add_suggestion(input).await?)
  }

  async fn list_suggestions(
    &self,
    place: Option<Uuid>,
  ) -> Result<Vec<ScoredSuggestion>, TestError> {
    self.enter(Op::ListSuggestions)?;
    Ok(self.inner.list_suggestions(place).await?)
  }

  async fn cast_vote(
    &self,
    suggestion_id: Uuid,
    user_id: Uuid,
    value: VoteValue,
  ) -> Result<VoteTransition, TestError> {
    self.enter(Op::CastVote)?;
    Ok(self.inner.cast_vote(suggestion_id, user_id, value).await?)
  }

  async fn add_todo(&self, input: NewTodo) -> Result<Todo, TestError> {
    self.enter(Op::AddTodo)?;
    Ok(self.inner.add_todo(input).await?)
  }

  async fn list_todos(&self, status: Option<TodoStatus>) -> Result<Vec<TodoView>, TestError> {
    self.enter(Op::ListTodos)?;
    Ok(self.inner.list_todos(status).await?)
  }

  async fn set_todo_status(
    &self,
    id: Uuid,
    status: TodoStatus,
    updated_by: Option<Uuid>,
  ) -> Result<Todo, TestError> {
    self.enter(Op::SetTodoStatus)?;
    Ok(self.inner.set_todo_status(id, status, updated_by).await?)
  }

  async fn set_todo_assignee(
    &self,
    id: Uuid,
    assignee_id: Option<Uuid>,
    updated_by: Option<Uuid>,
  ) -> Result<Todo, TestError> {
    self.enter(Op::SetTodoAssignee)?;
    Ok(self.inner.set_todo_assignee(id, assignee_id, updated_by).await?)
  }

  async fn append_audit(&self, input: NewAuditRecord) -> Result<AuditRecord, TestError> {
    self.enter(Op::AppendAudit)?;
    Ok(self.inner.append_audit(input).await?)
  }

  async fn list_audit(&self, limit: usize) -> Result<Vec<AuditEntry>, TestError> {
    self.enter(Op::ListAudit)?;
    Ok(self.inner.list_audit(limit).await?)
  }
}

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub struct Harness {
  pub store:   Arc<FaultyStore>,
  pub storage: Arc<MemoryStorage>,
  pub session: Session<FaultyStore>,
}

impl Harness {
  pub async fn new() -> Self {
    let store = Arc::new(FaultyStore::new().await);
    Self::with_store(store, Arc::new(MemoryStorage::new())).await
  }

  pub async fn with_store(store: Arc<FaultyStore>, storage: Arc<MemoryStorage>) -> Self {
    let session = Session::start(store.clone(), storage.clone(), Locale::En).await;
    Self { store, storage, session }
  }

  /// Create a user and make it active.
  pub async fn login(&self, name: &str) -> User {
    let user = self.store.inner.add_user(NewUser::new(name)).await.unwrap();
    self.session.identity().refresh_users(self.store.as_ref()).await.unwrap();
    self.session.identity().select(user.clone()).unwrap();
    user
  }

  pub async fn place(&self, name: &str, latitude: Option<f64>) -> Place {
    let mut input = NewPlace::new(name);
    input.latitude = latitude;
    self.store.inner.add_place(input).await.unwrap()
  }

  /// Audit records written so far, oldest first.
  pub async fn audit_log(&self) -> Vec<AuditRecord> {
    self.session.audit().flush().await;
    let mut records: Vec<_> = self
      .store
      .inner
      .list_audit(1_000)
      .await
      .unwrap()
      .into_iter()
      .map(|e| e.record)
      .collect();
    records.reverse();
    records
  }
}
