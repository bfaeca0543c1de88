//! Route tab: the ordered list of stops, plus the stop edit form.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use super::{cursor_style, pane, popup};
use crate::app::{App, EditField, EditForm};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let locale = app.locale();
  let rows = app.route_rows();

  let mut title = format!(" {} ({}) ", locale.pick("Route", "Route"), rows.len());
  if app.route.is_pending() {
    title.push_str(locale.pick("· saving… ", "· speichert… "));
  }
  let block = pane(title, true);

  if rows.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new(locale.pick(
        "No stops yet. Add one with `trek place add NAME --route`.",
        "Noch keine Stationen. Mit `trek place add NAME --route` hinzufügen.",
      ))
      .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = rows
    .iter()
    .zip(1..)
    .map(|(stop, n): (_, usize)| {
      let carried = app.grabbed == Some(stop.id());
      let name_style = if carried {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
      } else {
        Style::default()
      };

      let dates = match (stop.item.start_date, stop.item.end_date) {
        (Some(s), Some(e)) => format!("{} – {}", locale.date(s), locale.date(e)),
        (Some(s), None) => locale.date(s),
        (None, Some(e)) => format!("– {}", locale.date(e)),
        (None, None) => String::new(),
      };

      let mut spans = vec![
        Span::styled(format!("{n:>3}. "), Style::default().fg(Color::DarkGray)),
        Span::styled(if carried { "⇅ " } else { "  " }, name_style),
        Span::styled(stop.place.name.clone(), name_style),
      ];
      if let Some(region) = &stop.place.region {
        spans.push(Span::styled(format!(" ({region})"), Style::default().fg(Color::DarkGray)));
      }
      spans.push(Span::styled(
        format!("  [{}]", locale.route_status(stop.item.status)),
        Style::default().fg(Color::Cyan),
      ));
      if !dates.is_empty() {
        spans.push(Span::raw(format!("  {dates}")));
      }
      if let Some(notes) = &stop.item.notes {
        spans.push(Span::styled(format!("  {notes}"), Style::default().fg(Color::Gray)));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.route_cursor.min(rows.len() - 1)));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(cursor_style()),
    area,
    &mut state,
  );
}

pub fn draw_edit(f: &mut Frame, area: Rect, app: &App, form: &EditForm) {
  let locale = app.locale();
  let rect = popup(f, area, 60, 8);

  let block = Block::default()
    .title(format!(" {} ", form.place))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  let field = |label: &str, value: String, which: EditField| {
    let style = if form.field == which { cursor_style() } else { Style::default() };
    Line::from(vec![
      Span::styled(format!("{label:<10}"), Style::default().fg(Color::Gray)),
      Span::styled(value, style),
    ])
  };
  let text = |s: &str, which: EditField| {
    if form.field == which { format!("{s}_") } else { s.to_owned() }
  };

  let lines = vec![
    field(
      "Status",
      format!("‹ {} ›", locale.route_status(form.status)),
      EditField::Status,
    ),
    field(locale.pick("From", "Von"), text(&form.start, EditField::Start), EditField::Start),
    field(locale.pick("To", "Bis"), text(&form.end, EditField::End), EditField::End),
    field(locale.pick("Notes", "Notizen"), text(&form.notes, EditField::Notes), EditField::Notes),
  ];

  f.render_widget(Paragraph::new(lines).block(block), rect);
}
