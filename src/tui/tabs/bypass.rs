use super::{message_style, render_buffer, render_hint};
use crate::pages::RawBypassEditor;
use crate::tui::editor::TextBuffer;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, editor: &RawBypassEditor, buffer: &TextBuffer, editing: bool) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)].as_ref())
        .split(area);

    let title = if editor.saving {
        "Bypass list (saving...)"
    } else if editor.is_busy() {
        "Bypass list (loading...)"
    } else {
        "Bypass list"
    };
    render_buffer(f, chunks[0], buffer, title, editing);

    if let Some(ref message) = editor.message {
        let line = Paragraph::new(Line::from(vec![Span::styled(message.clone(), message_style(message))]));
        f.render_widget(line, chunks[1]);
    }

    let hint = if editing {
        "Esc: stop editing  Ctrl+S: save"
    } else {
        "e: edit  Ctrl+S: save  r: reload"
    };
    render_hint(f, chunks[2], hint);
}
