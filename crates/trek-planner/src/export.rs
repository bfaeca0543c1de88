//! Printable trip summary.
//!
//! [`TripSnapshot::fetch`] reads fresh copies of everything the document
//! needs; [`TripSnapshot::render`] lays it out as fixed-height plain-text
//! pages: a title page, the route, the top three suggestions per route stop,
//! and the open to-dos. Every page ends with a `Page i of n` footer. Nothing
//! here writes back to the store.

use std::{
  cmp::Ordering,
  path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, Utc};
use trek_core::{
  place::Place,
  route::RouteStop,
  store::TripStore,
  suggestion::ScoredSuggestion,
  todo::{TodoStatus, TodoView},
  user::User,
};

use crate::{Error, Result, labels::Locale, storage::StorageError};

/// Body lines per page, footer excluded.
pub const PAGE_HEIGHT: usize = 54;

const MAX_CELL: usize = 40;
const TOP_PER_PLACE: usize = 3;

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TripSnapshot {
  pub route:       Vec<RouteStop>,
  /// All suggestions, newest first.
  pub suggestions: Vec<ScoredSuggestion>,
  /// Open to-dos, earliest due date first, undated last.
  pub open_todos:  Vec<TodoView>,
  pub places:      Vec<Place>,
  pub users:       Vec<User>,
  pub taken_at:    DateTime<Utc>,
}

impl TripSnapshot {
  pub async fn fetch<S: TripStore>(store: &S) -> Result<Self> {
    let (route, suggestions, mut open_todos, places, users) = tokio::try_join!(
      store.list_route(),
      store.list_suggestions(None),
      store.list_todos(Some(TodoStatus::Open)),
      store.list_places(),
      store.list_users(),
    )
    .map_err(Error::backend)?;

    open_todos.sort_by(|a, b| by_due_date(a.todo.due_date, b.todo.due_date));

    Ok(Self { route, suggestions, open_todos, places, users, taken_at: Utc::now() })
  }

  /// The best suggestions for `place_id`: score descending, ties in
  /// snapshot order.
  pub fn top_for(&self, place_id: uuid::Uuid) -> Vec<&ScoredSuggestion> {
    let mut at_place: Vec<&ScoredSuggestion> = self
      .suggestions
      .iter()
      .filter(|s| s.suggestion.place_id == place_id)
      .collect();
    at_place.sort_by(|a, b| b.score.cmp(&a.score));
    at_place.truncate(TOP_PER_PLACE);
    at_place
  }

  pub fn render(&self, locale: Locale) -> Document {
    let t = |en, de| locale.pick(en, de);
    let mut pages = Paginator::new(PAGE_HEIGHT);

    // Title page.
    pages.push_block(vec![
      String::new(),
      centered(t("TRIP PLANNER", "REISEPLANER")),
      String::new(),
      centered(&format!(
        "{}: {}",
        t("Exported", "Exportiert"),
        self.taken_at.format("%Y-%m-%d %H:%M UTC")
      )),
      String::new(),
      centered(&format!(
        "{} {}  ·  {} {}  ·  {} {}",
        self.route.len(),
        t("stops", "Stationen"),
        self.suggestions.len(),
        t("suggestions", "Vorschläge"),
        self.open_todos.len(),
        t("open to-dos", "offene ToDos"),
      )),
    ]);
    pages.break_page();

    // Route.
    let rows = self
      .route
      .iter()
      .zip(1..)
      .map(|(stop, n): (&RouteStop, usize)| {
        vec![
          format!("#{n}"),
          stop.place.name.clone(),
          stop.item.start_date.map_or_else(|| "-".into(), |d| locale.date(d)),
          locale.route_status(stop.item.status).to_owned(),
          stop.item.notes.clone().unwrap_or_else(|| "-".into()),
        ]
      })
      .collect();
    let mut block = heading("Route");
    block.extend(table(
      &["#", t("Place", "Ort"), t("Date", "Datum"), "Status", t("Notes", "Notizen")],
      rows,
    ));
    pages.push_block(block);

    // Top suggestions per route stop.
    pages.push_block(heading(t("Top suggestions per place", "Top Vorschläge pro Ort")));
    for stop in &self.route {
      let top = self.top_for(stop.place.place_id);
      if top.is_empty() {
        continue;
      }
      let rows = top
        .iter()
        .zip(1..)
        .map(|(s, n): (&&ScoredSuggestion, usize)| {
          vec![
            format!("{n}."),
            s.suggestion.title.clone(),
            locale.category(s.suggestion.category).to_owned(),
            s.score.to_string(),
            s.suggestion.cost_estimate.clone().unwrap_or_else(|| "-".into()),
          ]
        })
        .collect();
      let mut block = vec![stop.place.name.clone()];
      block.extend(table(
        &["#", t("Title", "Titel"), t("Category", "Kategorie"), "Score", t("Cost", "Kosten")],
        rows,
      ));
      block.push(String::new());
      pages.push_block(block);
    }

    // Open to-dos.
    if !self.open_todos.is_empty() {
      let rows = self
        .open_todos
        .iter()
        .map(|v| {
          vec![
            v.todo.title.clone(),
            v.assignee.as_ref().map_or_else(|| "-".into(), |u| u.name.clone()),
            v.todo.due_date.map_or_else(|| "-".into(), |d| locale.date(d)),
          ]
        })
        .collect();
      let mut block = heading(t("Open to-dos", "Offene ToDos"));
      block.extend(table(
        &[t("Title", "Titel"), t("Assigned to", "Zugewiesen an"), t("Due", "Fällig")],
        rows,
      ));
      pages.push_block(block);
    }

    Document { date: self.taken_at.date_naive(), locale, pages: pages.finish() }
  }
}

fn by_due_date(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Ordering {
  match (a, b) {
    (Some(a), Some(b)) => a.cmp(&b),
    (Some(_), None) => Ordering::Less,
    (None, Some(_)) => Ordering::Greater,
    (None, None) => Ordering::Equal,
  }
}

// ─── Layout ──────────────────────────────────────────────────────────────────

const PAGE_WIDTH: usize = 78;

fn centered(text: &str) -> String {
  let width = text.chars().count();
  let pad = PAGE_WIDTH.saturating_sub(width) / 2;
  format!("{}{text}", " ".repeat(pad))
}

fn heading(text: &str) -> Vec<String> {
  vec![text.to_uppercase(), "=".repeat(text.chars().count()), String::new()]
}

fn clip(cell: &str) -> String {
  let cell = cell.replace('\n', " ");
  if cell.chars().count() <= MAX_CELL {
    return cell;
  }
  let mut clipped: String = cell.chars().take(MAX_CELL - 1).collect();
  clipped.push('…');
  clipped
}

fn pad(cell: &str, width: usize) -> String {
  let fill = width.saturating_sub(cell.chars().count());
  format!("{cell}{}", " ".repeat(fill))
}

/// Left-aligned columns sized to their widest cell.
fn table(headers: &[&str], rows: Vec<Vec<String>>) -> Vec<String> {
  let rows: Vec<Vec<String>> = rows
    .into_iter()
    .map(|r| r.iter().map(|c| clip(c)).collect())
    .collect();
  let widths: Vec<usize> = headers
    .iter()
    .enumerate()
    .map(|(i, h)| {
      rows
        .iter()
        .filter_map(|r| r.get(i))
        .map(|c| c.chars().count())
        .chain([h.chars().count()])
        .max()
        .unwrap_or(0)
    })
    .collect();

  let line = |cells: Vec<String>| {
    cells
      .iter()
      .zip(&widths)
      .map(|(c, &w)| pad(c, w))
      .collect::<Vec<_>>()
      .join("  ")
      .trim_end()
      .to_owned()
  };

  let mut out = vec![line(headers.iter().map(|h| (*h).to_owned()).collect())];
  out.push(
    widths
      .iter()
      .map(|&w| "-".repeat(w))
      .collect::<Vec<_>>()
      .join("  "),
  );
  out.extend(rows.into_iter().map(line));
  out.push(String::new());
  out
}

/// Fills fixed-height pages. A block that would straddle a page boundary
/// starts a fresh page when it fits on one, and is split otherwise.
struct Paginator {
  height:  usize,
  pages:   Vec<Vec<String>>,
  current: Vec<String>,
}

impl Paginator {
  fn new(height: usize) -> Self { Self { height, pages: Vec::new(), current: Vec::new() } }

  fn break_page(&mut self) {
    if !self.current.is_empty() {
      self.pages.push(std::mem::take(&mut self.current));
    }
  }

  fn push_block(&mut self, block: Vec<String>) {
    if self.current.len() + block.len() > self.height && block.len() <= self.height {
      self.break_page();
    }
    for line in block {
      if self.current.len() == self.height {
        self.break_page();
      }
      self.current.push(line);
    }
  }

  fn finish(mut self) -> Vec<Vec<String>> {
    self.break_page();
    self.pages
  }
}

// ─── Document ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Document {
  pub date: NaiveDate,
  locale:   Locale,
  pages:    Vec<Vec<String>>,
}

impl Document {
  pub fn page_count(&self) -> usize { self.pages.len() }

  /// One page's text, footer included. `index` is 0-based.
  pub fn page(&self, index: usize) -> Option<String> {
    let body = self.pages.get(index)?;
    let total = self.pages.len();
    let footer = match self.locale {
      Locale::En => format!("Page {} of {total}", index + 1),
      Locale::De => format!("Seite {} von {total}", index + 1),
    };
    let mut text = body.join("\n");
    text.push_str(&"\n".repeat(PAGE_HEIGHT.saturating_sub(body.len()) + 2));
    text.push_str(&centered(&footer));
    text.push('\n');
    Some(text)
  }

  /// All pages, separated by form feeds.
  pub fn to_text(&self) -> String {
    (0..self.page_count())
      .filter_map(|i| self.page(i))
      .collect::<Vec<_>>()
      .join("\x0c")
  }

  pub fn file_name(&self) -> String { format!("trek-{}.txt", self.date.format("%Y-%m-%d")) }

  /// Save into `dir` as `trek-YYYY-MM-DD.txt` and return the full path.
  pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).map_err(StorageError::from)?;
    let path = dir.join(self.file_name());
    std::fs::write(&path, self.to_text()).map_err(StorageError::from)?;
    tracing::info!(path = %path.display(), pages = self.page_count(), "exported trip");
    Ok(path)
  }
}
