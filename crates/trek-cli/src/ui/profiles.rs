//! Profile picker and the one-line input prompt.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::{cursor_style, popup};
use crate::app::App;

pub fn draw_picker(f: &mut Frame, area: Rect, app: &App, cursor: usize) {
  let locale = app.locale();
  let users = app.users();
  let active = app.active_user().map(|u| u.user_id);
  let height = (users.len() as u16).clamp(1, 12) + 4;
  let rect = popup(f, area, 40, height);

  let block = Block::default()
    .title(format!(" {} ", locale.pick("Who are you?", "Wer bist du?")))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  if users.is_empty() {
    f.render_widget(
      Paragraph::new(vec![
        Line::from(locale.pick("No profiles yet.", "Noch keine Profile.")),
        Line::from(Span::styled(
          locale.pick("Press n to create one.", "Mit n ein Profil anlegen."),
          Style::default().fg(Color::DarkGray),
        )),
      ])
      .block(block),
      rect,
    );
    return;
  }

  let items: Vec<ListItem> = users
    .iter()
    .map(|u| {
      let marker = if Some(u.user_id) == active { "● " } else { "  " };
      ListItem::new(format!("{marker}{}", u.name))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(cursor.min(users.len() - 1)));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(cursor_style()),
    rect,
    &mut state,
  );
}

pub fn draw_input(f: &mut Frame, area: Rect, label: &str, text: &str) {
  let rect = popup(f, area, 60, 3);
  let block = Block::default()
    .title(format!(" {label} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  f.render_widget(
    Paragraph::new(format!("{text}_")).style(Style::default().fg(Color::Yellow)).block(block),
    rect,
  );
}
