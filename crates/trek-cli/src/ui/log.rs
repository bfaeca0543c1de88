//! Log tab: the activity feed, with before/after panes under expanded rows.

use chrono::Utc;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{List, ListItem, ListState, Paragraph},
};

use super::{cursor_style, pane};
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let locale = app.locale();
  let rows = app.log.rows(Utc::now());
  let block = pane(format!(" {} ({}) ", locale.pick("Activity", "Aktivität"), rows.len()), true);

  if rows.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new(locale.pick("No activity yet.", "Noch keine Aktivität."))
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let dim = Style::default().fg(Color::DarkGray);
  let items: Vec<ListItem> = rows
    .iter()
    .map(|row| {
      let arrow = match (row.expandable, row.expanded) {
        (false, _) => "  ",
        (true, false) => "▸ ",
        (true, true) => "▾ ",
      };
      let mut lines = vec![Line::from(vec![
        Span::raw(arrow),
        Span::styled(row.actor.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" {} ", row.action)),
        Span::styled(row.entity, Style::default().fg(Color::Cyan)),
        Span::styled(format!("  {}", row.when), dim),
      ])];

      if row.expanded
        && let Some(panes) = app.log.panes(row.audit_id)
      {
        for (label, body) in [
          (locale.pick("Before", "Vorher"), panes.before),
          (locale.pick("After", "Nachher"), panes.after),
        ] {
          lines.push(Line::from(Span::styled(format!("    {label}:"), dim)));
          let body = body.unwrap_or_else(|| "—".to_owned());
          lines.extend(body.lines().map(|l| Line::from(Span::raw(format!("      {l}")))));
        }
      }
      ListItem::new(lines)
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.log_cursor.min(rows.len() - 1)));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(cursor_style()),
    area,
    &mut state,
  );
}
