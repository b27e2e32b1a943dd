use crate::pages::RulesView;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, view: &RulesView, scroll_offset: usize) {
    let mut content: Vec<Line> = Vec::new();

    if let Some(ref error) = view.error {
        content.push(Line::from(vec![Span::styled(
            format!("✗ {}", error),
            Style::default().fg(Color::Red),
        )]));
    } else if view.rules.is_empty() {
        content.push(Line::from(if view.is_loading() { "Loading..." } else { "No rule files loaded" }));
    }

    for (path, body) in view.entries() {
        content.push(Line::from(vec![Span::styled(
            format!("── {} ", path),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]));
        content.extend(body.lines().map(|l| Line::from(l.to_string())));
        content.push(Line::from(""));
    }

    let title = format!(
        "Rules ({} files, {} lines) - [↑/↓] to scroll",
        view.rules.len(),
        view.total_lines()
    );
    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((scroll_offset as u16, 0));

    f.render_widget(paragraph, area);
}
