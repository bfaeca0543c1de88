//! TUI rendering: header, the active tab, the status bar, then any overlay.

pub mod log;
pub mod places;
pub mod profiles;
pub mod route;
pub mod todos;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Flex, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::{App, Overlay, PlacesFocus, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.tab {
    Tab::Route => route::draw(f, rows[1], app),
    Tab::Places => places::draw(f, rows[1], app),
    Tab::Todos => todos::draw(f, rows[1], app),
    Tab::Log => log::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);

  match &app.overlay {
    Some(Overlay::Picker { cursor }) => profiles::draw_picker(f, area, app, *cursor),
    Some(Overlay::Input { prompt, text }) => {
      profiles::draw_input(f, area, prompt.label(app.locale()), text);
    }
    Some(Overlay::Edit(form)) => route::draw_edit(f, area, app, form),
    None => {}
  }
}

/// A centred box of at most `width` x `height`, cleared for drawing on top.
pub(crate) fn popup(f: &mut Frame, area: Rect, width: u16, height: u16) -> Rect {
  let [row] = Layout::vertical([Constraint::Length(height)])
    .flex(Flex::Center)
    .areas(area);
  let [cell] = Layout::horizontal([Constraint::Length(width)])
    .flex(Flex::Center)
    .areas(row);
  f.render_widget(Clear, cell);
  cell
}

pub(crate) fn pane(title: String, focused: bool) -> Block<'static> {
  Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(if focused {
      Style::default().fg(Color::Cyan)
    } else {
      Style::default().fg(Color::DarkGray)
    })
}

pub(crate) fn cursor_style() -> Style {
  Style::default()
    .bg(Color::Blue)
    .fg(Color::White)
    .add_modifier(Modifier::BOLD)
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let locale = app.locale();
  let date = Local::now().format("%Y-%m-%d").to_string();

  let mut spans = vec![Span::styled(
    " trek ",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  )];
  for (i, tab) in Tab::ALL.iter().enumerate() {
    let style = if *tab == app.tab {
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(format!(" {} {} ", i + 1, tab.label(locale)), style));
  }

  let who = app
    .active_user()
    .map_or_else(|| locale.pick("no profile", "kein Profil").to_owned(), |u| u.name);
  let right = Span::styled(format!("{who}  {date} "), Style::default().fg(Color::Gray));

  // Simple left-right header: pad the middle.
  let left_width: usize = spans.iter().map(|s| s.content.chars().count()).sum();
  let pad = (area.width as usize)
    .saturating_sub(left_width)
    .saturating_sub(right.content.chars().count());
  spans.push(Span::raw(" ".repeat(pad)));
  spans.push(right);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match (&app.overlay, app.tab) {
    (Some(Overlay::Picker { .. }), _) => ("PROFILE", "↑↓ choose  Enter use  n new  c sign out  Esc close"),
    (Some(Overlay::Input { .. }), _) => ("INPUT", "Type  Enter save  Esc cancel"),
    (Some(Overlay::Edit(_)), _) => ("EDIT", "Tab next field  ←→ status  Enter save  Esc cancel"),
    (None, _) if app.filter_active => ("SEARCH", "Type to filter  Esc clear  Enter done"),
    (None, Tab::Route) if app.grabbed.is_some() => ("MOVE", "↑↓ carry  Space/Enter drop  Esc cancel"),
    (None, Tab::Route) => ("ROUTE", "Space move  a auto-route  e edit  Tab next  p profile  x export  q quit"),
    (None, Tab::Places) if app.places_focus == PlacesFocus::Suggestions => {
      ("PLACES", "+/- vote  n new  t top/new  Esc places  q quit")
    }
    (None, Tab::Places) => ("PLACES", "/ search  Enter open  n suggest  N new place  t top/new  q quit"),
    (None, Tab::Todos) => ("TODOS", "n new  Space done  a assign  f filter  m person  q quit"),
    (None, Tab::Log) => ("LOG", "↑↓ navigate  Enter details  r reload  q quit"),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::Gray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
