//! Shared to-dos.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use trek_core::{
  audit::{ActionKind, EntityKind, NewAuditRecord},
  store::TripStore,
  todo::{NewTodo, Todo, TodoFilter, TodoView},
};
use uuid::Uuid;

use crate::{Error, Result, audit::AuditLogger, identity::IdentityContext, snapshot, sync::Synced};

pub struct TodosView<S> {
  store:    Arc<S>,
  identity: IdentityContext,
  audit:    AuditLogger,
  todos:    Synced<Vec<TodoView>>,
}

impl<S: TripStore> TodosView<S> {
  pub fn new(store: Arc<S>, identity: IdentityContext, audit: AuditLogger) -> Self {
    Self { store, identity, audit, todos: Synced::default() }
  }

  /// Every to-do, newest first.
  pub fn todos(&self) -> &[TodoView] { self.todos.value() }

  pub fn visible(&self, filter: &TodoFilter) -> Vec<&TodoView> {
    self.todos().iter().filter(|v| filter.matches(&v.todo)).collect()
  }

  fn find(&self, todo_id: Uuid) -> Result<&Todo> {
    self
      .todos()
      .iter()
      .map(|v| &v.todo)
      .find(|t| t.todo_id == todo_id)
      .ok_or_else(|| Error::not_found("todo", todo_id))
  }

  pub async fn load(&mut self) -> Result<&[TodoView]> {
    let todos = self.store.list_todos(None).await.map_err(Error::backend)?;
    self.todos.reconcile(todos);
    Ok(self.todos())
  }

  async fn refetch(&mut self) {
    match self.store.list_todos(None).await {
      Ok(todos) => self.todos.reconcile(todos),
      Err(e) => tracing::warn!(error = %e, "todo refetch failed"),
    }
  }

  pub async fn add(&mut self, title: &str, due_date: Option<NaiveDate>) -> Result<Todo> {
    let mut input = NewTodo::new(title).validate()?;
    input.due_date = due_date;
    input.created_by = self.identity.active_id();

    let todo = self.store.add_todo(input).await.map_err(Error::backend)?;
    self.audit.record(
      NewAuditRecord::new(ActionKind::Create, EntityKind::Todo, todo.todo_id)
        .after(snapshot(&todo)),
    );
    self.refetch().await;
    Ok(todo)
  }

  /// Flip a to-do between open and done.
  pub async fn toggle(&mut self, todo_id: Uuid) -> Result<Todo> {
    let previous = self.find(todo_id)?.status;
    let status = previous.toggled();

    self.todos.modify(|todos| {
      if let Some(v) = todos.iter_mut().find(|v| v.todo.todo_id == todo_id) {
        v.todo.status = status;
      }
    });

    let todo = self
      .store
      .set_todo_status(todo_id, status, self.identity.active_id())
      .await
      .map_err(Error::backend)?;

    self.audit.record(
      NewAuditRecord::new(ActionKind::Update, EntityKind::Todo, todo_id)
        .before(Some(json!({ "status": previous })))
        .after(Some(json!({ "status": status }))),
    );
    self.refetch().await;
    Ok(todo)
  }

  /// Set or clear the assignee.
  pub async fn assign(&mut self, todo_id: Uuid, assignee: Option<Uuid>) -> Result<Todo> {
    let previous = self.find(todo_id)?.assignee_id;

    let todo = self
      .store
      .set_todo_assignee(todo_id, assignee, self.identity.active_id())
      .await
      .map_err(Error::backend)?;

    self.audit.record(
      NewAuditRecord::new(ActionKind::Update, EntityKind::Todo, todo_id)
        .before(Some(json!({ "assignee_id": previous })))
        .after(Some(json!({ "assignee_id": assignee }))),
    );
    self.refetch().await;
    Ok(todo)
  }
}

/// The assignee after `current` in `users` order, wrapping through
/// "unassigned".
pub fn next_assignee(current: Option<Uuid>, users: &[Uuid]) -> Option<Uuid> {
  match current.and_then(|c| users.iter().position(|&u| u == c)) {
    None => users.first().copied(),
    Some(i) => users.get(i + 1).copied(),
  }
}
