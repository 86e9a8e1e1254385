use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::connectivity::StaleBanner;

/// Draw the stale-data banner line. Renders nothing when the banner is hidden.
pub fn draw_banner(frame: &mut Frame, area: Rect, banner: &StaleBanner) {
  if !banner.visible {
    return;
  }

  let mut spans = vec![Span::raw(" ")];

  if banner.offline {
    spans.push(Span::styled(
      "Offline - showing saved data",
      Style::default().fg(Color::Black),
    ));
  } else {
    spans.push(Span::styled(
      "Data may be out of date",
      Style::default().fg(Color::Black),
    ));
  }

  if banner.refreshing {
    spans.push(Span::styled(
      "  refreshing...",
      Style::default().fg(Color::DarkGray),
    ));
  } else if banner.show_refresh {
    spans.push(Span::styled(
      "  press r to refresh",
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Yellow));
  frame.render_widget(paragraph, area);
}
