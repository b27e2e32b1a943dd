use crate::api::{ApiClient, ApiResult};
use crate::config::AdminConfig;
use crate::pages::cache::CacheField;
use crate::pages::{
    download, BypassRulesEditor, CacheRulesEditor, EditMode, Latest, LogViewer, RawBypassEditor, RulesView,
    StatusView,
};
use crate::tui::editor::TextBuffer;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// Console routes, in sidebar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Status,
    Logs,
    Rules,
    Bypass,
    BypassRules,
    Cache,
    Help,
}

impl Route {
    pub const ALL: [Route; 7] = [
        Route::Status,
        Route::Logs,
        Route::Rules,
        Route::Bypass,
        Route::BypassRules,
        Route::Cache,
        Route::Help,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Status => "/status",
            Route::Logs => "/logs",
            Route::Rules => "/rules",
            Route::Bypass => "/bypass",
            Route::BypassRules => "/bypass-rules",
            Route::Cache => "/cache",
            Route::Help => "/help",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Status => "Status",
            Route::Logs => "Logs",
            Route::Rules => "Rules",
            Route::Bypass => "Bypass",
            Route::BypassRules => "Bypass Rules",
            Route::Cache => "Cache",
            Route::Help => "Help",
        }
    }

    /// `/` is the index route and lands on Status.
    pub fn from_path(path: &str) -> Option<Route> {
        let path = path.trim();
        let path = path.strip_suffix('/').unwrap_or(path);
        if path.is_empty() {
            return Some(Route::Status);
        }
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    pub fn resolve(path: &str) -> Route {
        Route::from_path(path).unwrap_or(Route::Status)
    }

    fn index(&self) -> usize {
        Route::ALL.iter().position(|r| r == self).unwrap_or(0)
    }

    pub fn next(&self) -> Route {
        Route::ALL[(self.index() + 1) % Route::ALL.len()]
    }

    pub fn previous(&self) -> Route {
        Route::ALL[(self.index() + Route::ALL.len() - 1) % Route::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Connecting,
    Disconnected(String), // Error message
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub route: Route,
    pub input_mode: InputMode,
    pub status: StatusView,
    pub logs: LogViewer,
    pub rules: RulesView,
    pub bypass: RawBypassEditor,
    pub bypass_rules: BypassRulesEditor,
    pub cache: CacheRulesEditor,
    pub bypass_buffer: TextBuffer,
    pub bypass_rules_buffer: TextBuffer,
    pub cache_raw_buffer: TextBuffer,
    /// Selected row and column of the cache table.
    pub cache_row: usize,
    pub cache_col: usize,
    /// Open single-line input for a cache table cell.
    pub field_input: Option<TextBuffer>,
    pub scroll_offset: usize,
    pub status_message: Option<String>, // For showing operation results
    pub should_quit: bool,
    client: ApiClient,
    download_dir: PathBuf,
    downloads: Latest<ApiResult<Vec<PathBuf>>>,
    mounted: HashSet<Route>,
}

impl App {
    pub fn new(client: ApiClient, config: &AdminConfig) -> Self {
        let debounce = Duration::from_millis(config.ui.validate_debounce_ms);
        let mut app = Self {
            route: Route::resolve(&config.ui.start_page),
            input_mode: InputMode::Normal,
            status: StatusView::new(client.clone()),
            logs: LogViewer::new(client.clone(), config.ui.page_size),
            rules: RulesView::new(client.clone()),
            bypass: RawBypassEditor::new(client.clone()),
            bypass_rules: BypassRulesEditor::new(client.clone(), debounce),
            cache: CacheRulesEditor::new(client.clone()),
            bypass_buffer: TextBuffer::new(),
            bypass_rules_buffer: TextBuffer::new(),
            cache_raw_buffer: TextBuffer::new(),
            cache_row: 0,
            cache_col: 0,
            field_input: None,
            scroll_offset: 0,
            status_message: None,
            should_quit: false,
            client,
            download_dir: config.ui.download_dir.clone(),
            downloads: Latest::new(),
            mounted: HashSet::new(),
        };
        // The connection indicator is driven by /status.
        app.status.load();
        app.mounted.insert(Route::Status);
        app.mount(app.route);
        app
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        match (&self.status.status, &self.status.error) {
            (_, Some(e)) => ConnectionStatus::Disconnected(e.clone()),
            (Some(_), None) => ConnectionStatus::Connected,
            (None, None) => ConnectionStatus::Connecting,
        }
    }

    fn mount(&mut self, route: Route) {
        if !self.mounted.insert(route) {
            return;
        }
        self.load_route(route);
    }

    fn load_route(&mut self, route: Route) {
        match route {
            Route::Status => self.status.load(),
            Route::Logs => {
                self.logs.load_latest();
            }
            Route::Rules => self.rules.load(),
            Route::Bypass => self.bypass.load(),
            Route::BypassRules => {
                self.bypass_rules.load();
            }
            Route::Cache => {
                self.cache.reload();
            }
            Route::Help => {}
        }
    }

    pub fn navigate(&mut self, route: Route) {
        if route == self.route {
            return;
        }
        if self.route == Route::Logs {
            // Leaving the pager cancels its request; it reloads on return.
            self.logs.unmount();
            self.mounted.remove(&Route::Logs);
        }
        self.route = route;
        self.input_mode = InputMode::Normal;
        self.field_input = None;
        self.scroll_offset = 0;
        self.mount(route);
    }

    pub fn next_tab(&mut self) {
        self.navigate(self.route.next());
    }

    pub fn previous_tab(&mut self) {
        self.navigate(self.route.previous());
    }

    pub fn scroll_up(&mut self) {
        if self.scroll_offset > 0 {
            self.scroll_offset -= 1;
        }
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset += 1;
    }

    /// Reload the current page.
    pub fn refresh(&mut self) {
        self.status_message = None;
        self.load_route(self.route);
    }

    /// Save the current page, if it is an editor.
    pub fn save(&mut self) {
        match self.route {
            Route::Bypass => {
                self.bypass.save();
            }
            Route::BypassRules => {
                if !self.bypass_rules.saving && !self.bypass_rules.save() {
                    self.status_message = Some("✗ Nothing to save".to_string());
                }
            }
            Route::Cache => {
                self.cache.save();
            }
            _ => {}
        }
    }

    pub fn start_download(&mut self) {
        if self.downloads.is_pending() {
            return;
        }
        let client = self.client.clone();
        let dir = self.download_dir.clone();
        let today = chrono::Local::now().date_naive();
        self.status_message = Some(format!("… Downloading logs to {}", dir.display()));
        self.downloads
            .start(async move { download::download_all(&client, &dir, today).await });
    }

    /// Collect finished requests and fire due timers. Called once per frame.
    pub fn tick(&mut self, now: Instant) {
        self.status.poll();
        self.logs.poll();
        self.rules.poll();
        if self.bypass.poll() {
            self.bypass_buffer.set_text(&self.bypass.text);
        }
        if self.bypass_rules.poll() {
            self.bypass_rules_buffer.set_text(&self.bypass_rules.raw);
        }
        self.bypass_rules.tick(now);
        if self.cache.poll() {
            self.cache_raw_buffer.set_text(&self.cache.raw);
            self.cache_row = self.cache_row.min(self.cache.rules.len().saturating_sub(1));
        }
        if let Some(result) = self.downloads.poll() {
            self.status_message = Some(match result {
                Ok(paths) => {
                    info!(files = paths.len(), "bulk download finished");
                    format!("✓ Downloaded {} files to {}", paths.len(), self.download_dir.display())
                }
                Err(e) => format!("✗ Download failed: {}", e),
            });
        }
    }

    /// Handle one key press. Returns false when the console should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return false;
        }
        // Ctrl+S is ours on every page, editing or not.
        if ctrl && key.code == KeyCode::Char('s') {
            self.save();
            return true;
        }

        if self.field_input.is_some() {
            self.handle_field_input(key);
            return true;
        }

        if self.input_mode == InputMode::Editing {
            self.handle_editing(key);
            return true;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                return false;
            }
            KeyCode::Tab => self.next_tab(),
            KeyCode::BackTab => self.previous_tab(),
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('e') => self.begin_editing(),
            _ => match self.route {
                Route::Logs => self.handle_logs_key(key),
                Route::Cache => self.handle_cache_key(key),
                _ => match key.code {
                    KeyCode::Up => self.scroll_up(),
                    KeyCode::Down => self.scroll_down(),
                    _ => {}
                },
            },
        }
        true
    }

    fn begin_editing(&mut self) {
        let editable = match self.route {
            Route::Bypass | Route::BypassRules => true,
            Route::Cache => self.cache.mode == EditMode::Raw,
            _ => false,
        };
        if editable {
            self.input_mode = InputMode::Editing;
        }
    }

    fn handle_editing(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Esc {
            self.input_mode = InputMode::Normal;
            return;
        }
        match self.route {
            Route::Bypass => {
                if self.bypass_buffer.handle_key(key) {
                    self.bypass.set_text(self.bypass_buffer.text());
                }
            }
            Route::BypassRules => {
                if self.bypass_rules_buffer.handle_key(key) {
                    self.bypass_rules
                        .set_raw(self.bypass_rules_buffer.text(), Instant::now());
                }
            }
            Route::Cache => {
                if self.cache_raw_buffer.handle_key(key) {
                    self.cache.raw = self.cache_raw_buffer.text();
                }
            }
            _ => self.input_mode = InputMode::Normal,
        }
    }

    fn handle_logs_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('s') => {
                self.logs.cycle_source();
            }
            KeyCode::Char('+') => {
                self.logs.cycle_page_size(true);
            }
            KeyCode::Char('-') => {
                self.logs.cycle_page_size(false);
            }
            KeyCode::Left | KeyCode::PageUp => {
                self.logs.prev_page();
            }
            KeyCode::Right | KeyCode::PageDown => {
                self.logs.next_page();
            }
            KeyCode::End => {
                self.logs.load_latest();
            }
            KeyCode::Up => self.logs.select_up(),
            KeyCode::Down => self.logs.select_down(),
            KeyCode::Enter => self.logs.show_detail = !self.logs.show_detail,
            KeyCode::Char('d') => self.start_download(),
            _ => {}
        }
    }

    fn handle_cache_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('m') => self.cache.toggle_mode(),
            KeyCode::Char('v') => {
                self.cache.validate();
            }
            KeyCode::Char('c') => self.cache.clear_messages(),
            _ if self.cache.mode == EditMode::Raw => match key.code {
                KeyCode::Up => self.scroll_up(),
                KeyCode::Down => self.scroll_down(),
                _ => {}
            },
            KeyCode::Char('a') => {
                self.cache_row = self.cache.add_rule();
            }
            KeyCode::Char('x') | KeyCode::Delete => {
                self.cache.remove_rule(self.cache_row);
                self.cache_row = self.cache_row.min(self.cache.rules.len().saturating_sub(1));
            }
            KeyCode::Up => self.cache_row = self.cache_row.saturating_sub(1),
            KeyCode::Down => {
                if self.cache_row + 1 < self.cache.rules.len() {
                    self.cache_row += 1;
                }
            }
            KeyCode::Left => self.cache_col = self.cache_col.saturating_sub(1),
            KeyCode::Right => self.cache_col = (self.cache_col + 1).min(CacheField::ALL.len() - 1),
            KeyCode::Enter => self.edit_cache_cell(),
            _ => {}
        }
    }

    fn edit_cache_cell(&mut self) {
        let field = CacheField::ALL[self.cache_col];
        match field {
            CacheField::Kind | CacheField::MatchType => self.cache.cycle_field(self.cache_row, field),
            _ => {
                if let Some(rule) = self.cache.rules.get(self.cache_row) {
                    self.field_input = Some(TextBuffer::single_line(&field.display(rule)));
                }
            }
        }
    }

    fn handle_field_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.field_input = None,
            KeyCode::Enter => {
                if let Some(input) = self.field_input.take() {
                    let field = CacheField::ALL[self.cache_col];
                    self.cache.set_field(self.cache_row, field, &input.text());
                }
            }
            _ => {
                if let Some(input) = self.field_input.as_mut() {
                    input.handle_key(key);
                }
            }
        }
    }

    pub fn render(&mut self, f: &mut Frame) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(0)].as_ref())
            .split(f.size());

        super::tabs::render_sidebar(f, columns[0], self.route, &self.connection_status());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Min(0),          // Content
                    Constraint::Length(if self.status_message.is_some() { 3 } else { 0 }), // Status bar
                ]
                .as_ref(),
            )
            .split(columns[1]);

        let editing = self.input_mode == InputMode::Editing;
        match self.route {
            Route::Status => super::tabs::status::render(f, chunks[0], &self.status, self.scroll_offset),
            Route::Logs => super::tabs::logs::render(f, chunks[0], &self.logs),
            Route::Rules => super::tabs::rules::render(f, chunks[0], &self.rules, self.scroll_offset),
            Route::Bypass => {
                super::tabs::bypass::render(f, chunks[0], &self.bypass, &self.bypass_buffer, editing)
            }
            Route::BypassRules => super::tabs::bypass_rules::render(
                f,
                chunks[0],
                &self.bypass_rules,
                &self.bypass_rules_buffer,
                editing,
            ),
            Route::Cache => super::tabs::cache::render(f, chunks[0], self, editing),
            Route::Help => super::tabs::help::render(f, chunks[0], self.scroll_offset),
        }

        // Render status message (if any)
        if let Some(ref status_msg) = self.status_message {
            let status_color = if status_msg.starts_with('✓') {
                Color::Green
            } else if status_msg.starts_with('…') {
                Color::Yellow
            } else {
                Color::Red
            };

            let status_widget = Paragraph::new(status_msg.as_str())
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(status_color))
                        .title("Status"),
                )
                .style(Style::default().fg(status_color));

            f.render_widget(status_widget, chunks[1]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_table() {
        assert_eq!(Route::from_path("/"), Some(Route::Status));
        assert_eq!(Route::from_path(""), Some(Route::Status));
        assert_eq!(Route::from_path("/logs"), Some(Route::Logs));
        assert_eq!(Route::from_path("cache/"), Some(Route::Cache));
        assert_eq!(Route::from_path("/bypass-rules"), Some(Route::BypassRules));
        assert_eq!(Route::from_path("/settings"), None);
        assert_eq!(Route::resolve("/settings"), Route::Status);
    }

    #[test]
    fn test_route_cycle() {
        assert_eq!(Route::Status.next(), Route::Logs);
        assert_eq!(Route::Status.previous(), Route::Help);
        assert_eq!(Route::Help.next(), Route::Status);
        for route in Route::ALL {
            assert_eq!(route.next().previous(), route);
        }
    }

    fn app() -> App {
        let mut config = AdminConfig::default();
        config.api.base_url = "http://127.0.0.1:9/mamotama-api".to_string();
        let client = ApiClient::from_config(&config.api).unwrap();
        App::new(client, &config)
    }

    #[tokio::test]
    async fn test_leaving_logs_cancels_load() {
        let mut app = app();
        app.navigate(Route::Logs);
        assert!(app.logs.is_loading());

        app.navigate(Route::Rules);
        assert!(!app.logs.is_loading());
        assert!(app.rules.is_loading());
    }

    #[tokio::test]
    async fn test_q_is_text_while_editing() {
        let mut app = app();
        app.navigate(Route::Bypass);
        app.handle_key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE));
        assert_eq!(app.input_mode, InputMode::Editing);

        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert_eq!(app.bypass.text, "q");

        app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(!app.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
    }

    #[tokio::test]
    async fn test_cache_table_keys() {
        let mut app = app();
        app.navigate(Route::Cache);
        app.cache.mode = EditMode::Table;

        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE));
        assert_eq!(app.cache.rules.len(), 2);
        assert_eq!(app.cache_row, 1);

        // Column 4 is TTL.
        for _ in 0..4 {
            app.handle_key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
        }
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert!(app.field_input.is_some());
        for _ in 0..3 {
            app.handle_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        }
        app.handle_key(KeyEvent::new(KeyCode::Char('6'), KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Char('0'), KeyModifiers::NONE));
        app.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        assert_eq!(app.cache.rules[1].ttl, Some(60));
        assert_eq!(app.cache.rules[0].ttl, Some(600));
    }
}
