use crate::pages::logs::row_tone;
use crate::pages::{LogViewer, RowTone};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

fn tone_style(tone: Option<RowTone>) -> Style {
    match tone {
        Some(RowTone::Block) => Style::default().fg(Color::Red),
        Some(RowTone::Allow) => Style::default().fg(Color::Rgb(255, 191, 0)),
        Some(RowTone::ServerError) => Style::default().fg(Color::Rgb(255, 140, 0)),
        None => Style::default().fg(Color::White),
    }
}

pub fn render(f: &mut Frame, area: Rect, viewer: &LogViewer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Min(5),
                Constraint::Length(if viewer.show_detail { 12 } else { 0 }),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let rows: Vec<Row> = viewer
        .lines
        .iter()
        .map(|line| {
            let cells = vec![
                Cell::from(line.ts().unwrap_or("-").to_string()),
                Cell::from(line.method().unwrap_or("-").to_string()),
                Cell::from(line.status().map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())),
                Cell::from(line.path().unwrap_or("-").to_string()),
                Cell::from(line.rule_id().unwrap_or_else(|| "-".to_string())),
                Cell::from(line.req_id().unwrap_or("-").to_string()),
            ];
            Row::new(cells).style(tone_style(row_tone(line)))
        })
        .collect();

    let widths = [
        Constraint::Length(25),
        Constraint::Length(7),
        Constraint::Length(6),
        Constraint::Min(20),
        Constraint::Length(10),
        Constraint::Length(18),
    ];

    let header = Row::new(vec!["Time", "Method", "Status", "Path", "Rule", "Request ID"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let range = match viewer.window {
        Some(w) if !w.is_empty() => format!("{}..{}", w.start, w.end),
        _ => "-".to_string(),
    };
    let mut title = format!(
        "Logs: {} | {} per page | lines {}",
        viewer.source.label(),
        viewer.page_size,
        range
    );
    if viewer.is_loading() {
        title.push_str(" (loading...)");
    }

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = TableState::default();
    if !viewer.lines.is_empty() {
        state.select(Some(viewer.selected));
    }
    f.render_stateful_widget(table, chunks[0], &mut state);

    if viewer.show_detail {
        let detail = viewer
            .selected_line()
            .map(|l| l.to_pretty_json())
            .unwrap_or_default();
        let paragraph = Paragraph::new(detail)
            .block(Block::default().borders(Borders::ALL).title("Detail"))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, chunks[1]);
    }

    let enabled = Style::default().fg(Color::Green);
    let disabled = Style::default().fg(Color::DarkGray);
    let nav = Line::from(vec![
        Span::styled("← older", if viewer.can_prev { enabled } else { disabled }),
        Span::raw("  "),
        Span::styled("newer →", if viewer.can_next { enabled } else { disabled }),
        Span::styled(
            "  End: latest  s: source  +/-: page size  Enter: detail  d: download all",
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    f.render_widget(Paragraph::new(nav), chunks[2]);
}
