use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::models::book::BookStatus;

/// Background color for each circulation status.
pub(crate) fn status_color(status: BookStatus) -> Color {
    match status {
        BookStatus::Available => Color::Rgb(0x16, 0xa3, 0x4a),
        BookStatus::Borrowed => Color::Rgb(0x6b, 0x72, 0x80),
        BookStatus::Unavailable => Color::Rgb(0x92, 0x4a, 0x4a),
    }
}

/// Colored pill showing the human label of a status.
pub(crate) fn status_badge(status: BookStatus) -> Span<'static> {
    Span::styled(
        format!(" {} ", status.label()),
        Style::default()
            .fg(Color::White)
            .bg(status_color(status))
            .add_modifier(Modifier::BOLD),
    )
}

/// Placeholder drawn while a blocking fetch is pending.
pub(crate) fn render_loading(frame: &mut Frame, area: Rect, what: &str) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        format!("Loading {what}..."),
        Style::default().fg(Color::DarkGray),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

/// Compute a centered rectangle taking a percentage of the available area.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
