//! Application state machine and event dispatcher.

use std::path::PathBuf;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use strum::IntoEnumIterator;
use trek_core::{
  ordering,
  place::{NewPlace, Place},
  route::{RouteItemUpdate, RouteStatus, RouteStop},
  suggestion::{NewSuggestion, ScoredSuggestion, VoteTransition, VoteValue},
  todo::{TodoFilter, TodoView},
  user::User,
};
use trek_planner::{
  Session,
  labels::Locale,
  log::LogView,
  profiles::Profiles,
  route::{ReorderReport, RouteView},
  suggestions::{Ranking, SuggestionsView},
  todos::{self, TodosView},
};
use trek_store_sqlite::SqliteStore;
use uuid::Uuid;

pub type Store = SqliteStore;

// ─── Tabs & overlays ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Route,
  Places,
  Todos,
  Log,
}

impl Tab {
  pub const ALL: [Tab; 4] = [Tab::Route, Tab::Places, Tab::Todos, Tab::Log];

  pub fn label(self, locale: Locale) -> &'static str {
    match self {
      Tab::Route => locale.pick("Route", "Route"),
      Tab::Places => locale.pick("Places", "Orte"),
      Tab::Todos => locale.pick("To-dos", "ToDos"),
      Tab::Log => locale.pick("Log", "Verlauf"),
    }
  }

  fn index(self) -> usize { Self::ALL.iter().position(|t| *t == self).unwrap_or(0) }

  fn step(self, forward: bool) -> Self {
    let n = Self::ALL.len();
    let i = if forward { self.index() + 1 } else { self.index() + n - 1 };
    Self::ALL[i % n]
  }
}

/// Which list has the cursor on the Places tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacesFocus {
  Places,
  Suggestions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
  NewPlace,
  NewSuggestion,
  NewTodo,
  NewProfile,
}

impl Prompt {
  pub fn label(self, locale: Locale) -> &'static str {
    match self {
      Prompt::NewPlace => locale.pick("New place", "Neuer Ort"),
      Prompt::NewSuggestion => locale.pick("New suggestion", "Neuer Vorschlag"),
      Prompt::NewTodo => locale.pick("New to-do [YYYY-MM-DD]", "Neues ToDo [JJJJ-MM-TT]"),
      Prompt::NewProfile => locale.pick("Your name", "Dein Name"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
  Status,
  Start,
  End,
  Notes,
}

impl EditField {
  const ORDER: [EditField; 4] = [EditField::Status, EditField::Start, EditField::End, EditField::Notes];

  fn step(self, forward: bool) -> Self {
    let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
    let n = Self::ORDER.len();
    Self::ORDER[if forward { i + 1 } else { i + n - 1 } % n]
  }
}

/// The route item edit form. Dates are typed as text and parsed on save.
#[derive(Debug, Clone)]
pub struct EditForm {
  pub item_id: Uuid,
  pub place:   String,
  pub status:  RouteStatus,
  pub start:   String,
  pub end:     String,
  pub notes:   String,
  pub field:   EditField,
}

impl EditForm {
  fn for_stop(stop: &RouteStop) -> Self {
    let date = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
    Self {
      item_id: stop.id(),
      place:   stop.place.name.clone(),
      status:  stop.item.status,
      start:   date(stop.item.start_date),
      end:     date(stop.item.end_date),
      notes:   stop.item.notes.clone().unwrap_or_default(),
      field:   EditField::Status,
    }
  }

  fn text_mut(&mut self) -> Option<&mut String> {
    match self.field {
      EditField::Status => None,
      EditField::Start => Some(&mut self.start),
      EditField::End => Some(&mut self.end),
      EditField::Notes => Some(&mut self.notes),
    }
  }

  /// `None` if a date does not parse.
  fn to_update(&self) -> Option<RouteItemUpdate> {
    Some(RouteItemUpdate {
      status:     self.status,
      start_date: parse_optional_date(&self.start)?,
      end_date:   parse_optional_date(&self.end)?,
      notes:      Some(self.notes.clone()),
    })
  }
}

pub enum Overlay {
  /// Profile picker; `cursor` indexes the identity's user list.
  Picker { cursor: usize },
  Input { prompt: Prompt, text: String },
  Edit(EditForm),
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub tab:     Tab,
  pub overlay: Option<Overlay>,

  pub route:       RouteView<Store>,
  pub suggestions: SuggestionsView<Store>,
  pub todos:       TodosView<Store>,
  pub log:         LogView<Store>,
  profiles:        Profiles<Store>,

  /// Cursor position within the route, counted in display rows.
  pub route_cursor: usize,

  /// Item picked up for a drag, if any.
  pub grabbed: Option<Uuid>,

  pub places_focus: PlacesFocus,

  /// Cursor within the *filtered* place list.
  pub place_cursor: usize,

  /// Current fuzzy-filter string (only editable when `filter_active`).
  pub filter: String,

  /// Whether the user is typing a filter query.
  pub filter_active: bool,

  pub suggestion_cursor: usize,
  pub ranking:           Ranking,

  pub todo_cursor: usize,
  pub todo_filter: TodoFilter,

  pub log_cursor: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  export_dir: PathBuf,
  session:    Session<Store>,
}

impl App {
  pub fn new(session: Session<Store>, export_dir: PathBuf) -> Self {
    // Without an active profile the picker comes first.
    let overlay = session
      .identity()
      .active()
      .is_none()
      .then_some(Overlay::Picker { cursor: 0 });
    Self {
      tab: Tab::Route,
      overlay,
      route: session.route(),
      suggestions: session.suggestions(),
      todos: session.todos(),
      log: session.log(),
      profiles: session.profiles(),
      route_cursor: 0,
      grabbed: None,
      places_focus: PlacesFocus::Places,
      place_cursor: 0,
      filter: String::new(),
      filter_active: false,
      suggestion_cursor: 0,
      ranking: Ranking::default(),
      todo_cursor: 0,
      todo_filter: TodoFilter::default(),
      log_cursor: 0,
      status_msg: String::new(),
      export_dir,
      session,
    }
  }

  pub fn into_session(self) -> Session<Store> { self.session }

  pub fn locale(&self) -> Locale { self.session.locale() }

  pub fn active_user(&self) -> Option<User> { self.session.identity().active() }

  pub fn users(&self) -> Vec<User> { self.session.identity().users() }

  fn say(&mut self, en: &'static str, de: &'static str) {
    self.status_msg = self.locale().pick(en, de).to_owned();
  }

  /// Show the user-facing message for a failed action.
  fn fail(&mut self, err: trek_planner::Error) {
    tracing::warn!(error = %err, "action failed");
    self.status_msg = err.user_message(self.locale());
  }

  // ── Data loading ──────────────────────────────────────────────────────────

  pub async fn load_all(&mut self) {
    self.status_msg.clear();
    if let Err(e) = self.route.load().await {
      self.fail(e);
    }
    if let Err(e) = self.suggestions.load().await {
      self.fail(e);
    }
    if let Err(e) = self.todos.load().await {
      self.fail(e);
    }
    self.reload_log().await;
    self.clamp_cursors();
  }

  async fn reload_log(&mut self) {
    // Let queued audit records land first.
    self.session.audit().flush().await;
    if let Err(e) = self.log.load().await {
      self.fail(e);
    }
  }

  fn clamp_cursors(&mut self) {
    let clamp = |cursor: &mut usize, len: usize| *cursor = (*cursor).min(len.saturating_sub(1));
    let places = self.filtered_places().len();
    let todos = self.visible_todos().len();
    clamp(&mut self.route_cursor, self.route.stops().len());
    clamp(&mut self.place_cursor, places);
    clamp(&mut self.suggestion_cursor, self.suggestions.suggestions().len());
    clamp(&mut self.todo_cursor, todos);
    clamp(&mut self.log_cursor, self.log.entries().len());
  }

  // ── Derived views ─────────────────────────────────────────────────────────

  /// The route as displayed: while dragging, the grabbed stop is shown at
  /// the cursor position.
  pub fn route_rows(&self) -> Vec<RouteStop> {
    let stops = self.route.stops();
    let preview = self.grabbed.and_then(|source| {
      let target = stops.get(self.route_cursor)?.id();
      ordering::move_item(stops, source, target, RouteStop::id)
    });
    preview.unwrap_or_else(|| stops.to_vec())
  }

  /// Places matching the current filter query.
  pub fn filtered_places(&self) -> Vec<&Place> {
    if self.filter.is_empty() {
      return self.suggestions.places().iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .suggestions
      .places()
      .iter()
      .filter(|p| {
        matcher.fuzzy_match(&p.name, &self.filter).is_some()
          || p
            .region
            .as_deref()
            .is_some_and(|r| matcher.fuzzy_match(r, &self.filter).is_some())
      })
      .collect()
  }

  pub fn ranked_suggestions(&self) -> Vec<&ScoredSuggestion> { self.suggestions.ranked(self.ranking) }

  pub fn visible_todos(&self) -> Vec<&TodoView> { self.todos.visible(&self.todo_filter) }

  /// Name of the person the to-do list is narrowed to, if any.
  pub fn assignee_filter_name(&self) -> Option<String> {
    let id = self.todo_filter.assignee?;
    Some(self.session.identity().user(id).map_or_else(|| "?".to_owned(), |u| u.name))
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    if let Some(overlay) = self.overlay.take() {
      self.handle_overlay_key(overlay, key).await;
      return Ok(true);
    }

    // Filter input mode: all printable keys go into the filter string.
    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    match key.code {
      KeyCode::Char('q') => return Ok(false),
      KeyCode::Tab => self.switch_tab(self.tab.step(true)).await,
      KeyCode::BackTab => self.switch_tab(self.tab.step(false)).await,
      KeyCode::Char(c @ '1'..='4') => {
        let tab = Tab::ALL[c as usize - '1' as usize];
        self.switch_tab(tab).await;
      }
      KeyCode::Char('p') if self.grabbed.is_none() => {
        self.overlay = Some(Overlay::Picker { cursor: 0 });
      }
      KeyCode::Char('r') if self.grabbed.is_none() => {
        self.load_all().await;
        self.say("Reloaded", "Neu geladen");
      }
      KeyCode::Char('x') if self.grabbed.is_none() => self.export().await,
      _ => match self.tab {
        Tab::Route => self.handle_route_key(key).await,
        Tab::Places => self.handle_places_key(key).await,
        Tab::Todos => self.handle_todos_key(key).await,
        Tab::Log => self.handle_log_key(key),
      },
    }
    Ok(true)
  }

  async fn switch_tab(&mut self, tab: Tab) {
    if self.grabbed.take().is_some() {
      self.say("Move cancelled", "Verschieben abgebrochen");
    }
    self.tab = tab;
    if tab == Tab::Log {
      self.reload_log().await;
      self.clamp_cursors();
    }
  }

  async fn export(&mut self) {
    let written = match self.session.export().await {
      Ok(document) => document.write_to(&self.export_dir),
      Err(e) => Err(e),
    };
    match written {
      Ok(path) => self.status_msg = format!("{} {}", self.locale().pick("Exported to", "Exportiert nach"), path.display()),
      Err(e) => self.fail(e),
    }
  }

  // ── Overlays ──────────────────────────────────────────────────────────────

  /// The overlay has been taken out of `self`; put it back to keep it open.
  async fn handle_overlay_key(&mut self, overlay: Overlay, key: KeyEvent) {
    match overlay {
      Overlay::Picker { cursor } => self.handle_picker_key(cursor, key).await,
      Overlay::Input { prompt, text } => self.handle_input_key(prompt, text, key).await,
      Overlay::Edit(form) => self.handle_edit_key(form, key).await,
    }
  }

  async fn handle_picker_key(&mut self, mut cursor: usize, key: KeyEvent) {
    let users = self.users();
    match key.code {
      KeyCode::Esc => return,
      KeyCode::Down | KeyCode::Char('j') => {
        if cursor + 1 < users.len() {
          cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => cursor = cursor.saturating_sub(1),
      KeyCode::Enter => {
        if let Some(user) = users.get(cursor).cloned() {
          let name = user.name.clone();
          match self.session.identity().select(user) {
            Ok(()) => self.status_msg = format!("{} {name}", self.locale().pick("Hello,", "Hallo,")),
            Err(e) => self.fail(e),
          }
          return;
        }
      }
      KeyCode::Char('n') => {
        self.overlay = Some(Overlay::Input { prompt: Prompt::NewProfile, text: String::new() });
        return;
      }
      KeyCode::Char('c') => {
        match self.session.identity().clear() {
          Ok(()) => self.say("Signed out", "Abgemeldet"),
          Err(e) => self.fail(e),
        }
        return;
      }
      _ => {}
    }
    self.overlay = Some(Overlay::Picker { cursor });
  }

  async fn handle_input_key(&mut self, prompt: Prompt, mut text: String, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        if prompt == Prompt::NewProfile {
          self.overlay = Some(Overlay::Picker { cursor: 0 });
        }
        return;
      }
      KeyCode::Enter => {
        self.submit(prompt, text).await;
        return;
      }
      KeyCode::Backspace => {
        text.pop();
      }
      KeyCode::Char(c) => text.push(c),
      _ => {}
    }
    self.overlay = Some(Overlay::Input { prompt, text });
  }

  async fn submit(&mut self, prompt: Prompt, text: String) {
    match prompt {
      Prompt::NewPlace => match self.suggestions.add_place(NewPlace::new(text)).await {
        Ok(place) => self.status_msg = format!("{} {}", self.locale().pick("Added", "Hinzugefügt:"), place.name),
        Err(e) => self.fail(e),
      },
      Prompt::NewSuggestion => {
        // The view files the suggestion under the selected place.
        let place_id = self.suggestions.selected_place().map(|p| p.place_id).unwrap_or_default();
        match self.suggestions.add_suggestion(NewSuggestion::new(place_id, text)).await {
          Ok(_) => self.say("Suggestion added", "Vorschlag hinzugefügt"),
          Err(e) => self.fail(e),
        }
      }
      Prompt::NewTodo => {
        let (title, due) = split_due_date(&text);
        match self.todos.add(title, due).await {
          Ok(_) => self.say("To-do added", "ToDo hinzugefügt"),
          Err(e) => self.fail(e),
        }
      }
      Prompt::NewProfile => match self.profiles.create(&text).await {
        Ok(user) => self.status_msg = format!("{} {}", self.locale().pick("Hello,", "Hallo,"), user.name),
        Err(e) => {
          self.fail(e);
          self.overlay = Some(Overlay::Input { prompt, text });
        }
      },
    }
    self.clamp_cursors();
  }

  async fn handle_edit_key(&mut self, mut form: EditForm, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => return,
      KeyCode::Enter => {
        let Some(update) = form.to_update() else {
          self.say("Dates must look like YYYY-MM-DD", "Datum bitte als JJJJ-MM-TT");
          self.overlay = Some(Overlay::Edit(form));
          return;
        };
        match self.route.edit(form.item_id, update).await {
          Ok(_) => self.say("Stop updated", "Station aktualisiert"),
          Err(e) => self.fail(e),
        }
        return;
      }
      KeyCode::Tab | KeyCode::Down => form.field = form.field.step(true),
      KeyCode::BackTab | KeyCode::Up => form.field = form.field.step(false),
      KeyCode::Left if form.field == EditField::Status => form.status = cycle_status(form.status, false),
      KeyCode::Right | KeyCode::Char(' ') if form.field == EditField::Status => {
        form.status = cycle_status(form.status, true);
      }
      KeyCode::Backspace => {
        if let Some(text) = form.text_mut() {
          text.pop();
        }
      }
      KeyCode::Char(c) => {
        if let Some(text) = form.text_mut() {
          text.push(c);
        }
      }
      _ => {}
    }
    self.overlay = Some(Overlay::Edit(form));
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => {}
    }
    self.place_cursor = 0;
  }

  // ── Route ─────────────────────────────────────────────────────────────────

  async fn handle_route_key(&mut self, key: KeyEvent) {
    let len = self.route.stops().len();
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.route_cursor + 1 < len {
          self.route_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.route_cursor = self.route_cursor.saturating_sub(1),
      KeyCode::Char(' ') if self.grabbed.is_none() => {
        if let Some(stop) = self.route.stops().get(self.route_cursor) {
          self.grabbed = Some(stop.id());
          self.say("Moving: ↑↓ to carry, space to drop, esc to cancel", "Verschieben: ↑↓ tragen, Leertaste ablegen, Esc abbrechen");
        }
      }
      KeyCode::Char(' ') | KeyCode::Enter => self.drop_grabbed().await,
      KeyCode::Esc => {
        if let Some(source) = self.grabbed.take() {
          if let Some(i) = self.route.stops().iter().position(|s| s.id() == source) {
            self.route_cursor = i;
          }
          self.say("Move cancelled", "Verschieben abgebrochen");
        }
      }
      KeyCode::Char('a') if self.grabbed.is_none() => {
        if let Some(report) = self.route.auto_route().await {
          self.report_reorder(&report);
        }
      }
      KeyCode::Char('e') if self.grabbed.is_none() => {
        if let Some(stop) = self.route.stops().get(self.route_cursor) {
          self.overlay = Some(Overlay::Edit(EditForm::for_stop(stop)));
        }
      }
      _ => {}
    }
  }

  async fn drop_grabbed(&mut self) {
    let Some(source) = self.grabbed.take() else { return };
    let Some(target) = self.route.stops().get(self.route_cursor).map(RouteStop::id) else { return };
    match self.route.reorder(source, target).await {
      Some(report) => self.report_reorder(&report),
      None => self.status_msg.clear(),
    }
    self.clamp_cursors();
  }

  fn report_reorder(&mut self, report: &ReorderReport) {
    if report.is_clean() && report.reconciled {
      self.say("Route saved", "Route gespeichert");
      return;
    }
    let total = report.written + report.failed.len();
    self.status_msg = format!(
      "{} ({}/{total})",
      self.locale().pick("Saving failed", "Fehler beim Speichern"),
      report.failed.len(),
    );
  }

  // ── Places ────────────────────────────────────────────────────────────────

  async fn handle_places_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('/') => {
        self.places_focus = PlacesFocus::Places;
        self.filter_active = true;
        self.filter.clear();
        self.place_cursor = 0;
        return;
      }
      KeyCode::Char('t') => {
        self.ranking = self.ranking.toggled();
        self.suggestion_cursor = 0;
        return;
      }
      KeyCode::Char('n') => {
        self.overlay = Some(Overlay::Input { prompt: Prompt::NewSuggestion, text: String::new() });
        return;
      }
      KeyCode::Char('N') => {
        self.overlay = Some(Overlay::Input { prompt: Prompt::NewPlace, text: String::new() });
        return;
      }
      _ => {}
    }

    match self.places_focus {
      PlacesFocus::Places => match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
          if self.place_cursor + 1 < self.filtered_places().len() {
            self.place_cursor += 1;
          }
        }
        KeyCode::Up | KeyCode::Char('k') => self.place_cursor = self.place_cursor.saturating_sub(1),
        KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
          let Some(place_id) = self.filtered_places().get(self.place_cursor).map(|p| p.place_id) else {
            return;
          };
          match self.suggestions.select_place(place_id).await {
            Ok(()) => {
              self.places_focus = PlacesFocus::Suggestions;
              self.suggestion_cursor = 0;
            }
            Err(e) => self.fail(e),
          }
        }
        KeyCode::Esc => self.filter.clear(),
        _ => {}
      },
      PlacesFocus::Suggestions => match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
          if self.suggestion_cursor + 1 < self.ranked_suggestions().len() {
            self.suggestion_cursor += 1;
          }
        }
        KeyCode::Up | KeyCode::Char('k') => {
          self.suggestion_cursor = self.suggestion_cursor.saturating_sub(1);
        }
        KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => self.places_focus = PlacesFocus::Places,
        KeyCode::Char('+') => self.vote(VoteValue::Up).await,
        KeyCode::Char('-') => self.vote(VoteValue::Down).await,
        _ => {}
      },
    }
  }

  async fn vote(&mut self, value: VoteValue) {
    let Some(id) = self.ranked_suggestions().get(self.suggestion_cursor).map(|s| s.id()) else {
      return;
    };
    match self.suggestions.vote(id, value).await {
      Ok(VoteTransition::Retract { .. }) => self.say("Vote removed", "Stimme entfernt"),
      Ok(_) => self.say("Vote saved", "Stimme gespeichert"),
      Err(e) => self.fail(e),
    }
    // Keep the cursor on the same suggestion after re-ranking.
    if let Some(i) = self.ranked_suggestions().iter().position(|s| s.id() == id) {
      self.suggestion_cursor = i;
    }
  }

  // ── Todos ─────────────────────────────────────────────────────────────────

  async fn handle_todos_key(&mut self, key: KeyEvent) {
    let cursor_todo = self.visible_todos().get(self.todo_cursor).map(|v| (v.todo.todo_id, v.todo.assignee_id));
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.todo_cursor + 1 < self.visible_todos().len() {
          self.todo_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.todo_cursor = self.todo_cursor.saturating_sub(1),
      KeyCode::Char('n') => {
        self.overlay = Some(Overlay::Input { prompt: Prompt::NewTodo, text: String::new() });
      }
      KeyCode::Char(' ') => {
        if let Some((id, _)) = cursor_todo {
          match self.todos.toggle(id).await {
            Ok(todo) => {
              let status = self.locale().todo_status(todo.status);
              self.status_msg = format!("{}: {status}", todo.title);
            }
            Err(e) => self.fail(e),
          }
        }
      }
      KeyCode::Char('a') => {
        if let Some((id, current)) = cursor_todo {
          let ids: Vec<Uuid> = self.users().iter().map(|u| u.user_id).collect();
          if let Err(e) = self.todos.assign(id, todos::next_assignee(current, &ids)).await {
            self.fail(e);
          }
        }
      }
      KeyCode::Char('f') => {
        self.todo_filter.status = self.todo_filter.status.next();
        self.todo_cursor = 0;
      }
      KeyCode::Char('m') => {
        // Everyone in name order, then back to all to-dos.
        let ids: Vec<Uuid> = self.users().iter().map(|u| u.user_id).collect();
        self.todo_filter.assignee = todos::next_assignee(self.todo_filter.assignee, &ids);
        self.todo_cursor = 0;
      }
      _ => {}
    }
    self.clamp_cursors();
  }

  // ── Log ───────────────────────────────────────────────────────────────────

  fn handle_log_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Down | KeyCode::Char('j') => {
        if self.log_cursor + 1 < self.log.entries().len() {
          self.log_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.log_cursor = self.log_cursor.saturating_sub(1),
      KeyCode::Enter => {
        if let Some(id) = self.log.entries().get(self.log_cursor).map(|e| e.record.audit_id) {
          self.log.toggle(id);
        }
      }
      _ => {}
    }
  }
}

// ─── Input helpers ────────────────────────────────────────────────────────────

/// `Ok(None)` for blank input, `None` if it is not a date.
fn parse_optional_date(text: &str) -> Option<Option<NaiveDate>> {
  let text = text.trim();
  if text.is_empty() {
    return Some(None);
  }
  NaiveDate::parse_from_str(text, "%Y-%m-%d").ok().map(Some)
}

/// Split a trailing `YYYY-MM-DD` off a to-do title.
fn split_due_date(input: &str) -> (&str, Option<NaiveDate>) {
  let input = input.trim();
  if let Some((title, last)) = input.rsplit_once(' ')
    && let Ok(date) = NaiveDate::parse_from_str(last, "%Y-%m-%d")
  {
    return (title.trim_end(), Some(date));
  }
  (input, None)
}

fn cycle_status(status: RouteStatus, forward: bool) -> RouteStatus {
  let all: Vec<RouteStatus> = RouteStatus::iter().collect();
  let i = all.iter().position(|s| *s == status).unwrap_or(0);
  let n = all.len();
  all[if forward { i + 1 } else { i + n - 1 } % n]
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use trek_core::{store::TripStore, todo::NewTodo, user::NewUser};
  use trek_planner::storage::MemoryStorage;

  use super::*;

  #[tokio::test]
  async fn assignee_filter_cycles_through_everyone() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let anna = store.add_user(NewUser::new("Anna")).await.unwrap();
    let binh = store.add_user(NewUser::new("Binh")).await.unwrap();
    store
      .add_todo(NewTodo { assignee_id: Some(binh.user_id), ..NewTodo::new("Visa") })
      .await
      .unwrap();
    store.add_todo(NewTodo::new("Adapters")).await.unwrap();

    let session = Session::start(store, Arc::new(MemoryStorage::new()), Locale::En).await;
    let mut app = App::new(session, std::env::temp_dir());
    app.load_all().await;
    app.overlay = None;
    app.tab = Tab::Todos;
    assert_eq!(app.visible_todos().len(), 2);

    let m = KeyEvent::from(KeyCode::Char('m'));
    app.handle_key(m).await.unwrap();
    assert_eq!(app.todo_filter.assignee, Some(anna.user_id));
    assert_eq!(app.assignee_filter_name().as_deref(), Some("Anna"));
    assert!(app.visible_todos().is_empty());

    app.handle_key(m).await.unwrap();
    assert_eq!(app.assignee_filter_name().as_deref(), Some("Binh"));
    let titles: Vec<_> = app.visible_todos().iter().map(|v| v.todo.title.clone()).collect();
    assert_eq!(titles, ["Visa"]);

    app.handle_key(m).await.unwrap();
    assert_eq!(app.assignee_filter_name(), None);
    assert_eq!(app.visible_todos().len(), 2);

    app.into_session().shutdown().await;
  }

  #[test]
  fn trailing_date_becomes_due_date() {
    let (title, due) = split_due_date("Book ferry to Cat Ba 2025-04-02");
    assert_eq!(title, "Book ferry to Cat Ba");
    assert_eq!(due, NaiveDate::from_ymd_opt(2025, 4, 2));

    assert_eq!(split_due_date("  Visa  "), ("Visa", None));
    assert_eq!(split_due_date("Call 2025-13-01"), ("Call 2025-13-01", None));
  }

  #[test]
  fn blank_dates_clear_and_bad_dates_reject() {
    assert_eq!(parse_optional_date(" "), Some(None));
    assert_eq!(parse_optional_date("2025-03-01"), Some(NaiveDate::from_ymd_opt(2025, 3, 1)));
    assert_eq!(parse_optional_date("01.03.2025"), None);
  }

  #[test]
  fn status_cycles_both_ways() {
    assert_eq!(cycle_status(RouteStatus::Planned, true), RouteStatus::InProgress);
    assert_eq!(cycle_status(RouteStatus::Skipped, true), RouteStatus::Planned);
    assert_eq!(cycle_status(RouteStatus::Planned, false), RouteStatus::Skipped);
  }

  #[test]
  fn tabs_wrap() {
    assert_eq!(Tab::Log.step(true), Tab::Route);
    assert_eq!(Tab::Route.step(false), Tab::Log);
  }
}
