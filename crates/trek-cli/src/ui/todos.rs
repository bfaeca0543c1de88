//! Todos tab.

use chrono::Local;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{List, ListItem, ListState, Paragraph},
};
use trek_core::todo::TodoStatus;

use super::{cursor_style, pane};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let locale = app.locale();
  let visible = app.visible_todos();
  let today = Local::now().date_naive();

  let mut title = format!(
    " {} · {} ({}/{}) ",
    locale.pick("To-dos", "ToDos"),
    locale.status_filter(app.todo_filter.status),
    visible.len(),
    app.todos.todos().len(),
  );
  if let Some(name) = app.assignee_filter_name() {
    title.push_str(&format!("· @{name} "));
  }
  let block = pane(title, true);

  if visible.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new(locale.pick("Nothing here. Press n to add a to-do.", "Nichts zu tun. Mit n ein ToDo anlegen."))
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = visible
    .iter()
    .map(|view| {
      let todo = &view.todo;
      let done = todo.status == TodoStatus::Done;
      let title_style = if done {
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
      } else {
        Style::default()
      };

      let mut spans = vec![
        Span::raw(if done { "[x] " } else { "[ ] " }),
        Span::styled(todo.title.clone(), title_style),
      ];
      if let Some(due) = todo.due_date {
        let overdue = !done && due < today;
        spans.push(Span::styled(
          format!("  {}", locale.date(due)),
          Style::default().fg(if overdue { Color::Red } else { Color::Gray }),
        ));
      }
      let assignee = view
        .assignee
        .as_ref()
        .map_or_else(|| "–".to_owned(), |u| u.name.clone());
      spans.push(Span::styled(format!("  @{assignee}"), Style::default().fg(Color::Cyan)));
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.todo_cursor.min(visible.len() - 1)));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(cursor_style()),
    area,
    &mut state,
  );
}
