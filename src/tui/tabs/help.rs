use crate::tui::app::Route;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn section(title: &str) -> Line<'static> {
    Line::from(vec![Span::styled(
        title.to_string(),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    )])
}

fn key(keys: &str, action: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<16}", keys), Style::default().fg(Color::Green)),
        Span::raw(action.to_string()),
    ])
}

fn page(route: Route) -> &'static str {
    match route {
        Route::Status => "Backend /status response",
        Route::Logs => "Cursor-paginated WAF, access-error and interesting logs",
        Route::Rules => "Loaded rule files (read-only)",
        Route::Bypass => "Legacy plain-text bypass list",
        Route::BypassRules => "Bypass rules with live validation and conditional save",
        Route::Cache => "Cache rules as a table or raw cache.conf",
        Route::Help => "This help screen",
    }
}

pub fn render(f: &mut Frame, area: Rect, scroll_offset: usize) {
    let mut content = vec![
        Line::from(vec![Span::styled(
            "Mamotama Admin - Keyboard Shortcuts",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )]),
        Line::from(""),
        section("Navigation"),
        key("Tab", "Next page"),
        key("Shift+Tab", "Previous page"),
        key("↑ / ↓", "Scroll or move selection"),
        key("q / Ctrl+C", "Quit (q only outside the editor)"),
        Line::from(""),
        section("Editing"),
        key("e", "Edit the current buffer"),
        key("Esc", "Stop editing"),
        key("Ctrl+S", "Save"),
        key("r", "Reload from the backend"),
        Line::from(""),
        section("Logs"),
        key("← / PageUp", "Older page"),
        key("→ / PageDown", "Newer page"),
        key("End", "Latest page"),
        key("s", "Next log source"),
        key("+ / -", "Page size 30 / 50 / 100 / 200"),
        key("Enter", "Toggle detail of the selected line"),
        key("d", "Download all sources (gzip NDJSON)"),
        Line::from(""),
        section("Cache rules"),
        key("m", "Switch table / raw mode"),
        key("v", "Validate"),
        key("a / x", "Add / remove rule"),
        key("← / →", "Select column"),
        key("Enter", "Edit cell (cycles kind and match type)"),
        key("c", "Clear messages"),
        Line::from(""),
        section("Pages"),
    ];
    content.extend(
        Route::ALL
            .iter()
            .map(|route| key(&format!("{} {}", route.title(), route.path()), page(*route))),
    );
    content.push(Line::from(""));
    content.push(Line::from(vec![
        Span::styled("Version: ", Style::default().fg(Color::Gray)),
        Span::raw(format!("mamotama-admin v{}", crate::VERSION)),
    ]));

    let widget = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title("Help"))
        .scroll((scroll_offset as u16, 0));

    f.render_widget(widget, area);
}
