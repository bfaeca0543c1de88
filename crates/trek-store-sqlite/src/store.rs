//! [`SqliteStore`], the SQLite implementation of [`TripStore`].

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _};
use uuid::Uuid;

use trek_core::{
  audit::{AuditEntry, AuditRecord, NewAuditRecord},
  place::{NewPlace, Place},
  route::{NewRouteItem, RouteItem, RouteItemUpdate, RouteStop},
  store::TripStore,
  suggestion::{NewSuggestion, ScoredSuggestion, Suggestion, VoteTransition, VoteValue},
  todo::{NewTodo, Todo, TodoStatus, TodoView},
  user::{NewUser, User, validate_name},
};

use crate::{
  Error, Result,
  encode::{
    AUDIT_COLUMNS, PLACE_COLUMNS, ROUTE_ITEM_COLUMNS, RawAudit, RawAuditEntry, RawPlace,
    RawRouteItem, RawRouteStop, RawScoredSuggestion, RawSuggestion, RawTodo, RawTodoView,
    RawUser, RawVote, SUGGESTION_COLUMNS, TODO_COLUMNS, USER_COLUMNS, VOTE_COLUMNS,
    assemble_suggestions, encode_date, encode_dt, encode_uuid, now,
  },
  schema::SCHEMA,
};

/// The single field a to-do update rewrites.
#[derive(Clone, Copy)]
enum TodoChange {
  Status(TodoStatus),
  Assignee(Option<Uuid>),
}

/// Result of a write that first checks the rows it touches.
enum Outcome<T> {
  Applied(T),
  /// The row being written does not exist.
  Missing,
  /// A referenced row does not exist.
  Dangling(Uuid),
}

fn exists(conn: &Connection, sql: &str, id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(sql, rusqlite::params![id], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

fn user_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
  exists(conn, "SELECT 1 FROM users WHERE user_id = ?1", id)
}

fn place_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
  exists(conn, "SELECT 1 FROM places WHERE place_id = ?1", id)
}

fn select_todo(conn: &Connection, id: &str) -> rusqlite::Result<Option<RawTodo>> {
  conn
    .query_row(
      &format!("SELECT {TODO_COLUMNS} FROM todos t WHERE t.todo_id = ?1"),
      rusqlite::params![id],
      |row| RawTodo::read(row, 0),
    )
    .optional()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A trip store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Apply a todo field change and return the updated row.
  async fn update_todo(
    &self,
    id: Uuid,
    change: TodoChange,
    updated_by: Option<Uuid>,
  ) -> Result<Todo> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let assignee = match change {
          TodoChange::Assignee(user) => user,
          TodoChange::Status(_) => None,
        };
        for user in [updated_by, assignee].into_iter().flatten() {
          if !user_exists(&tx, &encode_uuid(user))? {
            return Ok(Outcome::Dangling(user));
          }
        }
        let by_str = updated_by.map(encode_uuid);
        let changed = match change {
          TodoChange::Status(status) => tx.execute(
            "UPDATE todos SET status = ?1, updated_at = ?2, updated_by = ?3 WHERE todo_id = ?4",
            rusqlite::params![status.as_ref(), at_str, by_str, id_str],
          )?,
          TodoChange::Assignee(user) => tx.execute(
            "UPDATE todos SET assignee_id = ?1, updated_at = ?2, updated_by = ?3
             WHERE todo_id = ?4",
            rusqlite::params![user.map(encode_uuid), at_str, by_str, id_str],
          )?,
        };
        if changed == 0 {
          return Ok(Outcome::Missing);
        }
        let row = select_todo(&tx, &id_str)?;
        tx.commit()?;
        Ok(row.map_or(Outcome::Missing, Outcome::Applied))
      })
      .await?;

    match outcome {
      Outcome::Applied(raw) => raw.into_todo(),
      Outcome::Missing => Err(Error::TodoNotFound(id)),
      Outcome::Dangling(user) => Err(Error::UserNotFound(user)),
    }
  }
}

// ─── TripStore impl ──────────────────────────────────────────────────────────

impl TripStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let input = input.validate()?;
    let user = User {
      user_id:    Uuid::new_v4(),
      name:       input.name,
      avatar_url: input.avatar_url,
      created_at: now(),
    };

    let id_str     = encode_uuid(user.user_id);
    let name       = user.name.clone();
    let avatar_url = user.avatar_url.clone();
    let at_str     = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, name, avatar_url, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, avatar_url, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.user_id = ?1"),
              rusqlite::params![id_str],
              |row| RawUser::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users u ORDER BY u.name, u.rowid"))?;
        let rows = stmt
          .query_map([], |row| RawUser::read(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn rename_user(&self, id: Uuid, name: String) -> Result<User> {
    let name   = validate_name(&name)?;
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE users SET name = ?1 WHERE user_id = ?2",
          rusqlite::params![name, id_str],
        )?;
        let row = tx
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.user_id = ?1"),
            rusqlite::params![id_str],
            |row| RawUser::read(row, 0),
          )
          .optional()?;
        tx.commit()?;
        Ok(row)
      })
      .await?;

    raw.ok_or(Error::UserNotFound(id))?.into_user()
  }

  // ── Places ────────────────────────────────────────────────────────────────

  async fn add_place(&self, input: NewPlace) -> Result<Place> {
    let input = input.validate()?;
    let place = Place {
      place_id:   Uuid::new_v4(),
      name:       input.name,
      region:     input.region,
      latitude:   input.latitude,
      longitude:  input.longitude,
      created_at: now(),
      created_by: input.created_by,
    };

    let id_str    = encode_uuid(place.place_id);
    let name      = place.name.clone();
    let region    = place.region.clone();
    let (lat, lon) = (place.latitude, place.longitude);
    let at_str    = encode_dt(place.created_at);
    let created_by = place.created_by;

    let outcome = self
      .conn
      .call(move |conn| {
        if let Some(user) = created_by
          && !user_exists(conn, &encode_uuid(user))?
        {
          return Ok(Outcome::Dangling(user));
        }
        let by_str = created_by.map(encode_uuid);
        conn.execute(
          "INSERT INTO places (place_id, name, region, latitude, longitude, created_at, created_by)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, name, region, lat, lon, at_str, by_str],
        )?;
        Ok(Outcome::Applied(()))
      })
      .await?;

    match outcome {
      Outcome::Applied(()) => Ok(place),
      Outcome::Missing => Err(Error::PlaceNotFound(place.place_id)),
      Outcome::Dangling(user) => Err(Error::UserNotFound(user)),
    }
  }

  async fn get_place(&self, id: Uuid) -> Result<Option<Place>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawPlace> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PLACE_COLUMNS} FROM places p WHERE p.place_id = ?1"),
              rusqlite::params![id_str],
              |row| RawPlace::read(row, 0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPlace::into_place).transpose()
  }

  async fn list_places(&self) -> Result<Vec<Place>> {
    let raws: Vec<RawPlace> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {PLACE_COLUMNS} FROM places p ORDER BY p.name, p.rowid"))?;
        let rows = stmt
          .query_map([], |row| RawPlace::read(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPlace::into_place).collect()
  }

  // ── Route ─────────────────────────────────────────────────────────────────

  async fn add_route_item(&self, input: NewRouteItem) -> Result<RouteItem> {
    let input = input.normalized();
    let now = now();
    let mut item = RouteItem {
      item_id:     Uuid::new_v4(),
      place_id:    input.place_id,
      order_index: 0,
      status:      input.status,
      start_date:  input.start_date,
      end_date:    input.end_date,
      notes:       input.notes,
      created_at:  now,
      updated_at:  now,
    };

    let id_str     = encode_uuid(item.item_id);
    let place_str  = encode_uuid(item.place_id);
    let status     = item.status.as_ref().to_owned();
    let start_str  = item.start_date.map(encode_date);
    let end_str    = item.end_date.map(encode_date);
    let notes      = item.notes.clone();
    let at_str     = encode_dt(now);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !place_exists(&tx, &place_str)? {
          return Ok(Outcome::Missing);
        }
        let next: i64 = tx.query_row(
          "SELECT COALESCE(MAX(order_index), 0) + 1 FROM route_items",
          [],
          |row| row.get(0),
        )?;
        tx.execute(
          "INSERT INTO route_items (
             item_id, place_id, order_index, status, start_date, end_date, notes,
             created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          rusqlite::params![id_str, place_str, next, status, start_str, end_str, notes, at_str],
        )?;
        tx.commit()?;
        Ok(Outcome::Applied(next))
      })
      .await?;

    match outcome {
      Outcome::Applied(next) => {
        item.order_index = u32::try_from(next)
          .map_err(|_| Error::Decode(format!("order_index out of range: {next}")))?;
        Ok(item)
      }
      _ => Err(Error::PlaceNotFound(item.place_id)),
    }
  }

  async fn list_route(&self) -> Result<Vec<RouteStop>> {
    let raws: Vec<RawRouteStop> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ROUTE_ITEM_COLUMNS}, {PLACE_COLUMNS}
           FROM route_items r
           JOIN places p ON p.place_id = r.place_id
           ORDER BY r.order_index, r.created_at, r.rowid"
        ))?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawRouteStop { item: RawRouteItem::read(row, 0)?, place: RawPlace::read(row, 9)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRouteStop::into_stop).collect()
  }

  async fn update_route_item(&self, id: Uuid, update: RouteItemUpdate) -> Result<RouteItem> {
    let update    = update.normalized();
    let id_str    = encode_uuid(id);
    let status    = update.status.as_ref().to_owned();
    let start_str = update.start_date.map(encode_date);
    let end_str   = update.end_date.map(encode_date);
    let notes     = update.notes;
    let at_str    = encode_dt(now());

    let raw: Option<RawRouteItem> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "UPDATE route_items
           SET status = ?1, start_date = ?2, end_date = ?3, notes = ?4, updated_at = ?5
           WHERE item_id = ?6",
          rusqlite::params![status, start_str, end_str, notes, at_str, id_str],
        )?;
        let row = tx
          .query_row(
            &format!("SELECT {ROUTE_ITEM_COLUMNS} FROM route_items r WHERE r.item_id = ?1"),
            rusqlite::params![id_str],
            |row| RawRouteItem::read(row, 0),
          )
          .optional()?;
        tx.commit()?;
        Ok(row)
      })
      .await?;

    raw.ok_or(Error::RouteItemNotFound(id))?.into_item()
  }

  async fn set_order_index(&self, id: Uuid, order_index: u32) -> Result<()> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE route_items SET order_index = ?1, updated_at = ?2 WHERE item_id = ?3",
          rusqlite::params![order_index, at_str, id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::RouteItemNotFound(id));
    }
    Ok(())
  }

  // ── Suggestions & votes ───────────────────────────────────────────────────

  async fn add_suggestion(&self, input: NewSuggestion) -> Result<Suggestion> {
    let input = input.validate()?;
    let suggestion = Suggestion {
      suggestion_id: Uuid::new_v4(),
      place_id:      input.place_id,
      title:         input.title,
      description:   input.description,
      category:      input.category,
      link:          input.link,
      cost_estimate: input.cost_estimate,
      created_at:    now(),
      created_by:    input.created_by,
    };

    let id_str      = encode_uuid(suggestion.suggestion_id);
    let place_str   = encode_uuid(suggestion.place_id);
    let title       = suggestion.title.clone();
    let description = suggestion.description.clone();
    let category    = suggestion.category.as_ref().to_owned();
    let link        = suggestion.link.clone();
    let cost        = suggestion.cost_estimate.clone();
    let at_str      = encode_dt(suggestion.created_at);
    let created_by  = suggestion.created_by;

    let outcome = self
      .conn
      .call(move |conn| {
        if !place_exists(conn, &place_str)? {
          return Ok(Outcome::Missing);
        }
        if let Some(user) = created_by
          && !user_exists(conn, &encode_uuid(user))?
        {
          return Ok(Outcome::Dangling(user));
        }
        let by_str = created_by.map(encode_uuid);
        conn.execute(
          "INSERT INTO suggestions (
             suggestion_id, place_id, title, description, category, link,
             cost_estimate, created_at, created_by
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          rusqlite::params![
            id_str, place_str, title, description, category, link, cost, at_str, by_str,
          ],
        )?;
        Ok(Outcome::Applied(()))
      })
      .await?;

    match outcome {
      Outcome::Applied(()) => Ok(suggestion),
      Outcome::Missing => Err(Error::PlaceNotFound(suggestion.place_id)),
      Outcome::Dangling(user) => Err(Error::UserNotFound(user)),
    }
  }

  async fn list_suggestions(&self, place: Option<Uuid>) -> Result<Vec<ScoredSuggestion>> {
    let place_str = place.map(encode_uuid);

    let (rows, votes): (Vec<RawScoredSuggestion>, Vec<RawVote>) = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUGGESTION_COLUMNS}, {USER_COLUMNS}
           FROM suggestions s
           LEFT JOIN users u ON u.user_id = s.created_by
           WHERE ?1 IS NULL OR s.place_id = ?1
           ORDER BY s.created_at DESC, s.rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![place_str], |row| {
            Ok(RawScoredSuggestion {
              suggestion: RawSuggestion::read(row, 0)?,
              creator:    RawUser::read_joined(row, 9)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {VOTE_COLUMNS}
           FROM votes v
           JOIN suggestions s ON s.suggestion_id = v.suggestion_id
           WHERE ?1 IS NULL OR s.place_id = ?1
           ORDER BY v.created_at, v.rowid"
        ))?;
        let votes = stmt
          .query_map(rusqlite::params![place_str], RawVote::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, votes))
      })
      .await?;

    assemble_suggestions(rows, votes)
  }

  async fn cast_vote(
    &self,
    suggestion_id: Uuid,
    user_id: Uuid,
    value: VoteValue,
  ) -> Result<VoteTransition> {
    let suggestion_str = encode_uuid(suggestion_id);
    let user_str       = encode_uuid(user_id);
    let vote_id_str    = encode_uuid(Uuid::new_v4());
    let cast           = value.as_i64();
    let at_str         = encode_dt(now());

    // Read-before-write inside one transaction; the UNIQUE constraint on
    // (suggestion_id, user_id) backs it up.
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !exists(&tx, "SELECT 1 FROM suggestions WHERE suggestion_id = ?1", &suggestion_str)? {
          return Ok(Outcome::Missing);
        }
        if !user_exists(&tx, &user_str)? {
          return Ok(Outcome::Dangling(user_id));
        }

        let previous: Option<i64> = tx
          .query_row(
            "SELECT value FROM votes WHERE suggestion_id = ?1 AND user_id = ?2",
            rusqlite::params![suggestion_str, user_str],
            |row| row.get(0),
          )
          .optional()?;

        match previous {
          None => {
            tx.execute(
              "INSERT INTO votes (vote_id, suggestion_id, user_id, value, created_at)
               VALUES (?1, ?2, ?3, ?4, ?5)",
              rusqlite::params![vote_id_str, suggestion_str, user_str, cast, at_str],
            )?;
          }
          Some(prev) if prev == cast => {
            tx.execute(
              "DELETE FROM votes WHERE suggestion_id = ?1 AND user_id = ?2",
              rusqlite::params![suggestion_str, user_str],
            )?;
          }
          Some(_) => {
            tx.execute(
              "UPDATE votes SET value = ?1 WHERE suggestion_id = ?2 AND user_id = ?3",
              rusqlite::params![cast, suggestion_str, user_str],
            )?;
          }
        }

        tx.commit()?;
        Ok(Outcome::Applied(previous))
      })
      .await?;

    match outcome {
      Outcome::Applied(previous) => {
        let previous = previous.map(VoteValue::try_from).transpose()?;
        Ok(VoteTransition::decide(previous, value))
      }
      Outcome::Missing => Err(Error::SuggestionNotFound(suggestion_id)),
      Outcome::Dangling(user) => Err(Error::UserNotFound(user)),
    }
  }

  // ── Todos ─────────────────────────────────────────────────────────────────

  async fn add_todo(&self, input: NewTodo) -> Result<Todo> {
    let input = input.validate()?;
    let now = now();
    let todo = Todo {
      todo_id:     Uuid::new_v4(),
      title:       input.title,
      description: input.description,
      due_date:    input.due_date,
      assignee_id: input.assignee_id,
      status:      TodoStatus::Open,
      created_at:  now,
      created_by:  input.created_by,
      updated_at:  now,
      updated_by:  input.created_by,
    };

    let id_str       = encode_uuid(todo.todo_id);
    let title        = todo.title.clone();
    let description  = todo.description.clone();
    let due_str      = todo.due_date.map(encode_date);
    let (assignee, created_by) = (todo.assignee_id, todo.created_by);
    let status       = todo.status.as_ref().to_owned();
    let at_str       = encode_dt(now);

    let outcome = self
      .conn
      .call(move |conn| {
        for user in [assignee, created_by].into_iter().flatten() {
          if !user_exists(conn, &encode_uuid(user))? {
            return Ok(Outcome::Dangling(user));
          }
        }
        let assignee_str = assignee.map(encode_uuid);
        let by_str = created_by.map(encode_uuid);
        conn.execute(
          "INSERT INTO todos (
             todo_id, title, description, due_date, assignee_id, status,
             created_at, created_by, updated_at, updated_by
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?7, ?8)",
          rusqlite::params![
            id_str, title, description, due_str, assignee_str, status, at_str, by_str,
          ],
        )?;
        Ok(Outcome::Applied(()))
      })
      .await?;

    match outcome {
      Outcome::Applied(()) => Ok(todo),
      Outcome::Missing => Err(Error::TodoNotFound(todo.todo_id)),
      Outcome::Dangling(user) => Err(Error::UserNotFound(user)),
    }
  }

  async fn list_todos(&self, status: Option<TodoStatus>) -> Result<Vec<TodoView>> {
    let status_str = status.map(|s| s.as_ref().to_owned());

    let raws: Vec<RawTodoView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TODO_COLUMNS}, {USER_COLUMNS}
           FROM todos t
           LEFT JOIN users u ON u.user_id = t.assignee_id
           WHERE ?1 IS NULL OR t.status = ?1
           ORDER BY t.created_at DESC, t.rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![status_str], |row| {
            Ok(RawTodoView { todo: RawTodo::read(row, 0)?, assignee: RawUser::read_joined(row, 10)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTodoView::into_view).collect()
  }

  async fn set_todo_status(
    &self,
    id: Uuid,
    status: TodoStatus,
    updated_by: Option<Uuid>,
  ) -> Result<Todo> {
    self
      .update_todo(id, TodoChange::Status(status), updated_by)
      .await
  }

  async fn set_todo_assignee(
    &self,
    id: Uuid,
    assignee_id: Option<Uuid>,
    updated_by: Option<Uuid>,
  ) -> Result<Todo> {
    self
      .update_todo(id, TodoChange::Assignee(assignee_id), updated_by)
      .await
  }

  // ── Audit (append-only) ───────────────────────────────────────────────────

  async fn append_audit(&self, input: NewAuditRecord) -> Result<AuditRecord> {
    let record = AuditRecord {
      audit_id:    Uuid::new_v4(),
      action:      input.action,
      entity_kind: input.entity_kind,
      entity_id:   input.entity_id,
      actor_id:    input.actor_id,
      before:      input.before,
      after:       input.after,
      created_at:  now(),
    };

    let id_str      = encode_uuid(record.audit_id);
    let action      = record.action.as_ref().to_owned();
    let kind        = record.entity_kind.as_ref().to_owned();
    let entity_str  = record.entity_id.to_string();
    let actor_str   = record.actor_id.map(encode_uuid);
    let before_json = record.before.as_ref().map(serde_json::Value::to_string);
    let after_json  = record.after.as_ref().map(serde_json::Value::to_string);
    let at_str      = encode_dt(record.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO audit_logs (
             audit_id, action_type, entity_type, entity_id, actor_id,
             before_json, after_json, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str, action, kind, entity_str, actor_str, before_json, after_json, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(record)
  }

  async fn list_audit(&self, limit: usize) -> Result<Vec<AuditEntry>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawAuditEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {AUDIT_COLUMNS}, {USER_COLUMNS}
           FROM audit_logs a
           LEFT JOIN users u ON u.user_id = a.actor_id
           ORDER BY a.created_at DESC, a.rowid DESC
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit], |row| {
            Ok(RawAuditEntry { record: RawAudit::read(row, 0)?, actor: RawUser::read_joined(row, 8)? })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuditEntry::into_entry).collect()
  }
}
