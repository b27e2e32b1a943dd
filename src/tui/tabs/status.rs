use crate::pages::StatusView;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, view: &StatusView, scroll_offset: usize) {
    let mut content: Vec<Line> = Vec::new();

    if let Some(ref error) = view.error {
        content.push(Line::from(vec![Span::styled(
            format!("✗ {}", error),
            Style::default().fg(Color::Red),
        )]));
        content.push(Line::from(""));
    }

    match view.pretty() {
        Some(json) => content.extend(json.lines().map(|l| Line::from(l.to_string()))),
        None if view.is_loading() => content.push(Line::from("Loading...")),
        None => {}
    }

    let title = if view.is_loading() { "Status (loading)" } else { "Status" };
    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((scroll_offset as u16, 0));

    f.render_widget(paragraph, area);
}
