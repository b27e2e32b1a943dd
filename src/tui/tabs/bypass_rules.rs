use super::{message_style, render_buffer, render_hint};
use crate::pages::BypassRulesEditor;
use crate::tui::editor::TextBuffer;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, editor: &BypassRulesEditor, buffer: &TextBuffer, editing: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(8), Constraint::Length(1)].as_ref())
        .split(area);

    let mut title = String::from("Bypass rules");
    if editor.dirty() {
        title.push_str(" [modified]");
    }
    if editor.loading {
        title.push_str(" (loading...)");
    } else if editor.saving {
        title.push_str(" (saving...)");
    }
    render_buffer(f, chunks[0], buffer, &title, editing);

    let mut info: Vec<Line> = Vec::new();

    let badge = match &editor.validation {
        Some(v) if v.ok => Span::styled(" OK ", Style::default().fg(Color::Black).bg(Color::Green)),
        Some(_) => Span::styled(" NG ", Style::default().fg(Color::White).bg(Color::Red)),
        None if editor.validation_due().is_some() => Span::styled(" … ", Style::default().fg(Color::Yellow)),
        None => Span::styled(" - ", Style::default().fg(Color::DarkGray)),
    };
    info.push(Line::from(vec![
        Span::styled("Validation ", Style::default().add_modifier(Modifier::BOLD)),
        badge,
    ]));

    for message in editor.visible_messages() {
        info.push(Line::from(vec![Span::styled(
            format!("  {}", message),
            Style::default().fg(Color::Red),
        )]));
    }

    let etag = editor.etag.as_deref().unwrap_or("-");
    info.push(Line::from(vec![
        Span::styled("ETag: ", Style::default().fg(Color::Gray)),
        Span::raw(etag.to_string()),
    ]));
    if let Some(saved_at) = editor.saved_at {
        info.push(Line::from(vec![
            Span::styled("Last saved: ", Style::default().fg(Color::Gray)),
            Span::raw(saved_at.format("%H:%M:%S").to_string()),
        ]));
    }
    if let Some(ref message) = editor.message {
        info.push(Line::from(vec![Span::styled(message.clone(), message_style(message))]));
    }

    let panel = Paragraph::new(info)
        .block(Block::default().borders(Borders::TOP))
        .wrap(Wrap { trim: false });
    f.render_widget(panel, chunks[1]);

    let hint = if editing {
        "Esc: stop editing  Ctrl+S: save (If-Match)"
    } else if editor.can_save() {
        "e: edit  Ctrl+S: save  r: reload"
    } else {
        "e: edit  r: reload"
    };
    render_hint(f, chunks[2], hint);
}
