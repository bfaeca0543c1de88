//! The `TripStore` trait: the data-access client for the trip backend.
//!
//! The trait is implemented by storage backends (e.g. `trek-store-sqlite`).
//! The planner depends on this abstraction, not on any concrete backend.
//! Backends mint ids, stamp timestamps, and enforce references and enum
//! domains; callers hold only disposable copies of what they read.

use std::future::Future;

use uuid::Uuid;

use crate::{
  audit::{AuditEntry, AuditRecord, NewAuditRecord},
  place::{NewPlace, Place},
  route::{NewRouteItem, RouteItem, RouteItemUpdate, RouteStop},
  suggestion::{NewSuggestion, ScoredSuggestion, Suggestion, VoteTransition, VoteValue},
  todo::{NewTodo, Todo, TodoStatus, TodoView},
  user::{NewUser, User},
};

/// Abstraction over a trip backend.
///
/// Every method is a single request with per-call atomicity; there is no
/// transaction spanning calls. All methods return `Send` futures so the trait
/// can be used from spawned tokio tasks.
pub trait TripStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// All users, ordered by name.
  fn list_users(&self) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  fn rename_user(
    &self,
    id: Uuid,
    name: String,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  // ── Places ────────────────────────────────────────────────────────────

  fn add_place(
    &self,
    input: NewPlace,
  ) -> impl Future<Output = Result<Place, Self::Error>> + Send + '_;

  fn get_place(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Place>, Self::Error>> + Send + '_;

  /// All places, ordered by name.
  fn list_places(&self) -> impl Future<Output = Result<Vec<Place>, Self::Error>> + Send + '_;

  // ── Route ─────────────────────────────────────────────────────────────

  /// Append a stop at `max(order_index) + 1`.
  fn add_route_item(
    &self,
    input: NewRouteItem,
  ) -> impl Future<Output = Result<RouteItem, Self::Error>> + Send + '_;

  /// All route items joined with their place, ordered by `order_index`.
  fn list_route(&self) -> impl Future<Output = Result<Vec<RouteStop>, Self::Error>> + Send + '_;

  /// Replace the editable fields of one item.
  fn update_route_item(
    &self,
    id: Uuid,
    update: RouteItemUpdate,
  ) -> impl Future<Output = Result<RouteItem, Self::Error>> + Send + '_;

  /// Rewrite one item's `order_index`. No uniqueness check is made; a
  /// reorder is a sequence of these calls.
  fn set_order_index(
    &self,
    id: Uuid,
    order_index: u32,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Suggestions & votes ───────────────────────────────────────────────

  fn add_suggestion(
    &self,
    input: NewSuggestion,
  ) -> impl Future<Output = Result<Suggestion, Self::Error>> + Send + '_;

  /// Suggestions joined with creator and votes, newest first. `place`
  /// restricts the list to one place.
  fn list_suggestions(
    &self,
    place: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<ScoredSuggestion>, Self::Error>> + Send + '_;

  /// Cast `value` on `suggestion_id` for `user_id` as one atomic
  /// upsert-or-delete keyed on `(suggestion, user)`:
  ///
  /// - no existing vote → insert;
  /// - existing vote equal to `value` → delete (retraction);
  /// - existing vote with the other value → update in place.
  fn cast_vote(
    &self,
    suggestion_id: Uuid,
    user_id: Uuid,
    value: VoteValue,
  ) -> impl Future<Output = Result<VoteTransition, Self::Error>> + Send + '_;

  // ── Todos ─────────────────────────────────────────────────────────────

  fn add_todo(
    &self,
    input: NewTodo,
  ) -> impl Future<Output = Result<Todo, Self::Error>> + Send + '_;

  /// To-dos joined with their assignee, newest first.
  fn list_todos(
    &self,
    status: Option<TodoStatus>,
  ) -> impl Future<Output = Result<Vec<TodoView>, Self::Error>> + Send + '_;

  fn set_todo_status(
    &self,
    id: Uuid,
    status: TodoStatus,
    updated_by: Option<Uuid>,
  ) -> impl Future<Output = Result<Todo, Self::Error>> + Send + '_;

  fn set_todo_assignee(
    &self,
    id: Uuid,
    assignee_id: Option<Uuid>,
    updated_by: Option<Uuid>,
  ) -> impl Future<Output = Result<Todo, Self::Error>> + Send + '_;

  // ── Audit ─────────────────────────────────────────────────────────────

  /// Append one record; `created_at` is stamped by the store.
  fn append_audit(
    &self,
    input: NewAuditRecord,
  ) -> impl Future<Output = Result<AuditRecord, Self::Error>> + Send + '_;

  /// The most recent `limit` records joined with their actor, newest first.
  fn list_audit(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<AuditEntry>, Self::Error>> + Send + '_;
}
