//! Places tab: the fuzzy-filterable place list on the left, the selected
//! place's suggestions on the right.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Style},
  text::{Line, Span},
  widgets::{List, ListItem, ListState, Paragraph},
};
use trek_core::suggestion::VoteValue;
use trek_planner::suggestions::Ranking;

use super::{cursor_style, pane};
use crate::app::{App, PlacesFocus};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
    .split(area);

  draw_places(f, cols[0], app);
  draw_suggestions(f, cols[1], app);
}

fn draw_places(f: &mut Frame, area: Rect, app: &App) {
  let locale = app.locale();
  let filtered = app.filtered_places();
  let total = app.suggestions.places().len();
  let selected = app.suggestions.selected_place().map(|p| p.place_id);

  let label = locale.pick("Places", "Orte");
  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" {label} ({}/{total}) ", filtered.len())
  } else {
    format!(" {label} ({total}) ")
  };
  let block = pane(title, app.places_focus == PlacesFocus::Places);

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|place| {
      let marker = if Some(place.place_id) == selected { "▸ " } else { "  " };
      let mut spans = vec![Span::raw(marker), Span::raw(place.name.clone())];
      if let Some(region) = &place.region {
        spans.push(Span::styled(format!(" ({region})"), Style::default().fg(Color::DarkGray)));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter bar on the last inner line.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  let mut state = ListState::default();
  state.select(if filtered.is_empty() { None } else { Some(app.place_cursor) });
  f.render_stateful_widget(
    List::new(items).highlight_style(cursor_style()),
    inner_area,
    &mut state,
  );
}

fn draw_suggestions(f: &mut Frame, area: Rect, app: &App) {
  let locale = app.locale();
  let ranked = app.ranked_suggestions();
  let me = app.active_user().map(|u| u.user_id);

  let ranking = match app.ranking {
    Ranking::Top => locale.pick("Top", "Top"),
    Ranking::New => locale.pick("New", "Neu"),
  };
  let place = app
    .suggestions
    .selected_place()
    .map_or_else(|| locale.pick("Suggestions", "Vorschläge").to_owned(), |p| p.name.clone());
  let block = pane(
    format!(" {place} · {ranking} ({}) ", ranked.len()),
    app.places_focus == PlacesFocus::Suggestions,
  );

  if ranked.is_empty() {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new(locale.pick("No suggestions yet. Press n to add one.", "Noch keine Vorschläge. Mit n hinzufügen."))
        .style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = ranked
    .iter()
    .map(|s| {
      let mine = me.and_then(|id| s.vote_of(id));
      let (up, down) = match mine {
        Some(VoteValue::Up) => (Color::Green, Color::DarkGray),
        Some(VoteValue::Down) => (Color::DarkGray, Color::Red),
        None => (Color::DarkGray, Color::DarkGray),
      };
      let mut spans = vec![
        Span::styled("▲", Style::default().fg(up)),
        Span::raw(format!("{:>3} ", s.score)),
        Span::styled("▼ ", Style::default().fg(down)),
        Span::raw(s.suggestion.title.clone()),
        Span::styled(
          format!("  [{}]", locale.category(s.suggestion.category)),
          Style::default().fg(Color::Cyan),
        ),
      ];
      if let Some(cost) = &s.suggestion.cost_estimate {
        spans.push(Span::styled(format!("  {cost}"), Style::default().fg(Color::Gray)));
      }
      if let Some(creator) = &s.creator {
        spans.push(Span::styled(format!("  · {}", creator.name), Style::default().fg(Color::DarkGray)));
      }
      if let Some(link) = &s.suggestion.link {
        spans.push(Span::styled(format!("  {link}"), Style::default().fg(Color::Blue)));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut state = ListState::default();
  if app.places_focus == PlacesFocus::Suggestions {
    state.select(Some(app.suggestion_cursor));
  }
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(cursor_style()),
    area,
    &mut state,
  );
}
