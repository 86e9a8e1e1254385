mod banner;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Length(1), // Stale-data banner
      Constraint::Min(1),    // Body
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  draw_header(frame, chunks[0], app);
  banner::draw_banner(frame, chunks[1], &app.banner());
  draw_body(frame, chunks[2], app);
  draw_status_bar(frame, chunks[3]);
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
  let mut spans = vec![
    Span::raw(" "),
    Span::styled(app.title(), Style::default().fg(Color::Cyan).bold()),
  ];

  if app.unread_count() > 0 {
    spans.push(Span::styled(
      format!("  ({})", app.unread_count()),
      Style::default().fg(Color::Yellow).bold(),
    ));
  }

  let connectivity = if app.is_online() {
    Span::styled("  online", Style::default().fg(Color::Green))
  } else {
    Span::styled("  offline", Style::default().fg(Color::Red))
  };
  spans.push(connectivity);

  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_body(frame: &mut Frame, area: Rect, app: &App) {
  let mut lines = vec![
    Line::from(""),
    Line::from(format!("  route: {}", app.route())),
    Line::from(format!("  unread notifications: {}", app.unread_count())),
  ];

  if app.overlay_visible() {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
      "  Feliz Navidad de parte del ministerio - press Enter to dismiss",
      Style::default().fg(Color::Magenta).bold(),
    )));
  }

  frame.render_widget(Paragraph::new(lines), area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect) {
  let hint = " r:refresh roster  q:quit";
  frame.render_widget(
    Paragraph::new(hint).style(Style::default().fg(Color::DarkGray)),
    area,
  );
}
