pub mod bypass;
pub mod bypass_rules;
pub mod cache;
pub mod help;
pub mod logs;
pub mod rules;
pub mod status;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::tui::app::{ConnectionStatus, Route};
use crate::tui::editor::TextBuffer;

pub fn render_sidebar(f: &mut Frame, area: Rect, current: Route, connection_status: &ConnectionStatus) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)].as_ref())
        .split(area);

    let items: Vec<ListItem> = Route::ALL
        .iter()
        .map(|route| {
            let style = if *route == current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            let marker = if *route == current { "▶ " } else { "  " };
            ListItem::new(Line::from(vec![Span::styled(
                format!("{}{}", marker, route.title()),
                style,
            )]))
        })
        .collect();

    let nav = List::new(items).block(Block::default().borders(Borders::ALL).title("Mamotama Admin"));
    f.render_widget(nav, chunks[0]);

    let indicator = match connection_status {
        ConnectionStatus::Connected => Span::styled("● Connected", Style::default().fg(Color::Green)),
        ConnectionStatus::Connecting => Span::styled("● Connecting...", Style::default().fg(Color::Yellow)),
        ConnectionStatus::Disconnected(_) => Span::styled("● Disconnected", Style::default().fg(Color::Red)),
    };
    let footer = Paragraph::new(Line::from(vec![indicator])).block(Block::default().borders(Borders::ALL));
    f.render_widget(footer, chunks[1]);
}

/// Draw a text buffer, scrolled so the cursor stays visible, and place the
/// terminal cursor when the buffer has focus.
pub(crate) fn render_buffer(f: &mut Frame, area: Rect, buffer: &TextBuffer, title: &str, focused: bool) {
    let border = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    let (row, col) = buffer.cursor();
    let height = area.height.saturating_sub(2) as usize;
    let top = if height == 0 { 0 } else { row.saturating_sub(height - 1) };

    let lines: Vec<Line> = buffer
        .lines()
        .iter()
        .skip(top)
        .take(height)
        .map(|l| Line::from(l.as_str()))
        .collect();

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title.to_string()),
    );
    f.render_widget(widget, area);

    if focused {
        let x = area.x + 1 + col as u16;
        let y = area.y + 1 + (row - top) as u16;
        if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
            f.set_cursor(x, y);
        }
    }
}

/// One-line hint under an editor.
pub(crate) fn render_hint(f: &mut Frame, area: Rect, hint: &str) {
    let widget = Paragraph::new(Line::from(vec![Span::styled(
        hint.to_string(),
        Style::default().fg(Color::DarkGray),
    )]))
    .wrap(Wrap { trim: true });
    f.render_widget(widget, area);
}

/// Colour a page message by what it reports.
pub(crate) fn message_style(message: &str) -> Style {
    if message.starts_with("Saved") || message.starts_with("Validation OK") {
        Style::default().fg(Color::Green)
    } else if message.contains("failed") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Yellow)
    }
}
