use super::{message_style, render_buffer, render_hint};
use crate::pages::{CacheField, EditMode};
use crate::tui::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, List, ListItem, Paragraph, Row, Table},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App, editing: bool) {
    let editor = &app.cache;
    let message_height = if editor.messages.is_empty() {
        0
    } else {
        (editor.messages.len() as u16 + 2).min(8)
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(5),
                Constraint::Length(message_height),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let mode = match editor.mode {
        EditMode::Raw => "raw",
        EditMode::Table => "table",
    };
    let mut title = format!("Cache rules ({})", mode);
    if editor.loading {
        title.push_str(" (loading...)");
    } else if editor.saving {
        title.push_str(" (saving...)");
    }

    match editor.mode {
        EditMode::Raw => render_buffer(f, chunks[0], &app.cache_raw_buffer, &title, editing),
        EditMode::Table => render_table(f, chunks[0], app, &title),
    }

    if !editor.messages.is_empty() {
        let items: Vec<ListItem> = editor
            .messages
            .iter()
            .map(|m| ListItem::new(Line::from(vec![Span::styled(m.clone(), message_style(m))])))
            .collect();
        let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Messages (c: clear)"));
        f.render_widget(list, chunks[1]);
    }

    let hint = if let Some(ref input) = app.field_input {
        format!(
            "{}: {}▏  Enter: apply  Esc: cancel",
            CacheField::ALL[app.cache_col].label(),
            input.text()
        )
    } else {
        match (editor.mode, editing) {
            (EditMode::Raw, true) => "Esc: stop editing  Ctrl+S: save".to_string(),
            (EditMode::Raw, false) => "e: edit  m: table mode  v: validate  Ctrl+S: save  r: reload".to_string(),
            (EditMode::Table, _) => {
                "a: add  x: remove  ←/→: column  Enter: edit cell  m: raw mode  v: validate  Ctrl+S: save"
                    .to_string()
            }
        }
    };
    render_hint(f, chunks[2], &hint);
}

fn render_table(f: &mut Frame, area: Rect, app: &App, title: &str) {
    let header = Row::new(CacheField::ALL.iter().map(|field| Cell::from(field.label())))
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = app
        .cache
        .rules
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            let cells = CacheField::ALL.iter().enumerate().map(|(col, field)| {
                let text = field.display(rule);
                let style = if i == app.cache_row && col == app.cache_col {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else if i == app.cache_row {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Cell::from(if text.is_empty() { "-".to_string() } else { text }).style(style)
            });
            Row::new(cells)
        })
        .collect();

    let widths = [
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Min(16),
        Constraint::Length(14),
        Constraint::Length(8),
        Constraint::Min(12),
    ];

    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    if rows.is_empty() {
        let empty = Paragraph::new("No rules. Press 'a' to add one.").block(block);
        f.render_widget(empty, area);
        return;
    }

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}
