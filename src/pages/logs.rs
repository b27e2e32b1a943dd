use super::task::Latest;
use crate::api::{ApiClient, ApiResult, Direction, LogEvent, LogLine, LogQuery, LogSource, ReadResponse};
use tracing::{debug, warn};

/// Page sizes offered by the pager. The backend caps `tail` at 200.
pub const PAGE_SIZES: [u32; 4] = [30, 50, 100, 200];

/// Half-open `[start, end)` line window of the page on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub start: u64,
    pub end: u64,
}

impl PageWindow {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Compute the window covered by a response to a request made with `dir`.
pub fn page_window(dir: Option<Direction>, next_cursor: Option<u64>, count: usize) -> Option<PageWindow> {
    let cursor = next_cursor?;
    let count = count as u64;
    Some(match dir {
        Some(Direction::Prev) => PageWindow {
            start: cursor,
            end: cursor.saturating_add(count),
        },
        _ => PageWindow {
            start: cursor.saturating_sub(count),
            end: cursor,
        },
    })
}

/// Which navigation buttons are live after a response. Explicit
/// `has_prev`/`has_next` win; otherwise derive them from `has_more`.
pub fn navigation(dir: Option<Direction>, resp: &ReadResponse, window: Option<PageWindow>) -> (bool, bool) {
    let (derived_prev, derived_next) = match dir {
        Some(Direction::Prev) => (resp.has_more, true),
        _ => (window.map(|w| w.start > 0).unwrap_or(false), resp.has_more),
    };
    (
        resp.has_prev.unwrap_or(derived_prev),
        resp.has_next.unwrap_or(derived_next),
    )
}

/// Highlight class of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTone {
    Block,
    Allow,
    ServerError,
}

pub fn row_tone(line: &LogLine) -> Option<RowTone> {
    match line.event() {
        Some(LogEvent::WafBlock) => return Some(RowTone::Block),
        Some(LogEvent::WafHitAllow) => return Some(RowTone::Allow),
        _ => {}
    }
    match line.status() {
        Some(status) if status >= 500 => Some(RowTone::ServerError),
        _ => None,
    }
}

type LoadOutcome = (LogQuery, ApiResult<ReadResponse>);

/// Cursor-paginated view over one log source at a time.
pub struct LogViewer {
    client: ApiClient,
    pub source: LogSource,
    pub page_size: u32,
    pub lines: Vec<LogLine>,
    pub window: Option<PageWindow>,
    pub direction: Option<Direction>,
    pub can_prev: bool,
    pub can_next: bool,
    pub selected: usize,
    pub show_detail: bool,
    inflight: Latest<LoadOutcome>,
}

impl LogViewer {
    pub fn new(client: ApiClient, page_size: u32) -> Self {
        Self {
            client,
            source: LogSource::Waf,
            page_size,
            lines: Vec::new(),
            window: None,
            direction: None,
            can_prev: false,
            can_next: false,
            selected: 0,
            show_detail: false,
            inflight: Latest::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.inflight.is_pending()
    }

    /// Start a load, cancelling any load still in flight.
    pub fn load(&mut self, cursor: Option<u64>, dir: Option<Direction>) -> LogQuery {
        let query = LogQuery {
            src: self.source,
            tail: self.page_size,
            cursor,
            dir,
        };
        debug!(src = %query.src, tail = query.tail, ?cursor, ?dir, "loading log page");

        let client = self.client.clone();
        self.inflight.start(async move {
            let result = client.read_logs(&query).await;
            (query, result)
        });
        query
    }

    pub fn load_latest(&mut self) -> LogQuery {
        self.load(None, None)
    }

    fn reset(&mut self) {
        self.lines.clear();
        self.window = None;
        self.direction = None;
        self.can_prev = false;
        self.can_next = false;
        self.selected = 0;
        self.show_detail = false;
    }

    pub fn set_source(&mut self, source: LogSource) -> LogQuery {
        self.source = source;
        self.reset();
        self.load_latest()
    }

    pub fn set_page_size(&mut self, page_size: u32) -> LogQuery {
        self.page_size = page_size;
        self.reset();
        self.load_latest()
    }

    pub fn cycle_source(&mut self) -> LogQuery {
        self.set_source(self.source.next())
    }

    /// Step through `PAGE_SIZES`; `up` picks the next larger size.
    pub fn cycle_page_size(&mut self, up: bool) -> LogQuery {
        let idx = PAGE_SIZES.iter().position(|s| *s == self.page_size);
        let next = match (idx, up) {
            (Some(i), true) => PAGE_SIZES[(i + 1).min(PAGE_SIZES.len() - 1)],
            (Some(i), false) => PAGE_SIZES[i.saturating_sub(1)],
            (None, _) => PAGE_SIZES[0],
        };
        self.set_page_size(next)
    }

    /// Older page. `None` when the button would be disabled.
    pub fn prev_page(&mut self) -> Option<LogQuery> {
        if !self.can_prev {
            return None;
        }
        let window = self.window?;
        Some(self.load(Some(window.start), Some(Direction::Prev)))
    }

    /// Newer page. `None` when the button would be disabled.
    pub fn next_page(&mut self) -> Option<LogQuery> {
        if !self.can_next {
            return None;
        }
        let window = self.window?;
        Some(self.load(Some(window.end), Some(Direction::Next)))
    }

    /// Cancel the in-flight load when the view goes away.
    pub fn unmount(&mut self) {
        self.inflight.cancel();
    }

    /// Commit a finished load, if one arrived. Returns true when the view
    /// changed.
    pub fn poll(&mut self) -> bool {
        match self.inflight.poll() {
            Some((query, result)) => self.commit(query, result),
            None => false,
        }
    }

    /// Wait for the in-flight load and commit it.
    pub async fn settle(&mut self) -> bool {
        match self.inflight.wait().await {
            Some((query, result)) => self.commit(query, result),
            None => false,
        }
    }

    fn commit(&mut self, query: LogQuery, result: ApiResult<ReadResponse>) -> bool {
        match result {
            Ok(resp) => {
                self.apply_response(query.dir, resp);
                true
            }
            Err(e) => {
                warn!(src = %query.src, error = %e, "log page load failed");
                false
            }
        }
    }

    pub fn apply_response(&mut self, dir: Option<Direction>, resp: ReadResponse) {
        let window = page_window(dir, resp.next_cursor, resp.lines.len());
        let (can_prev, can_next) = navigation(dir, &resp, window);

        self.window = window;
        self.direction = dir;
        self.can_prev = can_prev;
        self.can_next = can_next;
        self.lines = resp.lines;
        self.selected = self.selected.min(self.lines.len().saturating_sub(1));
    }

    pub fn select_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        if self.selected + 1 < self.lines.len() {
            self.selected += 1;
        }
    }

    pub fn selected_line(&self) -> Option<&LogLine> {
        self.lines.get(self.selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn lines(n: usize) -> Vec<LogLine> {
        (0..n)
            .map(|i| serde_json::from_value(json!({"req_id": format!("r{}", i)})).unwrap())
            .collect()
    }

    fn viewer() -> LogViewer {
        // Nothing listens here; loads in these tests are never awaited.
        let client = ApiClient::new("http://127.0.0.1:9/mamotama-api", None, Duration::from_secs(1)).unwrap();
        LogViewer::new(client, 30)
    }

    #[test]
    fn test_latest_page_window() {
        let window = page_window(None, Some(500), 30).unwrap();
        assert_eq!(window, PageWindow { start: 470, end: 500 });
        assert_eq!(window.len(), 30);
    }

    #[test]
    fn test_prev_page_window() {
        let window = page_window(Some(Direction::Prev), Some(440), 30).unwrap();
        assert_eq!(window, PageWindow { start: 440, end: 470 });
    }

    #[test]
    fn test_short_head_page_clamps_at_zero() {
        let window = page_window(Some(Direction::Next), Some(12), 12).unwrap();
        assert_eq!(window, PageWindow { start: 0, end: 12 });
        assert!(page_window(None, None, 5).is_none());
    }

    #[test]
    fn test_huge_prev_cursor_saturates() {
        let window = page_window(Some(Direction::Prev), Some(u64::MAX - 5), 30).unwrap();
        assert_eq!(window, PageWindow { start: u64::MAX - 5, end: u64::MAX });
    }

    #[test]
    fn test_window_width_matches_line_count() {
        for (dir, cursor, count) in [
            (None, 1000u64, 30usize),
            (Some(Direction::Prev), 0, 17),
            (Some(Direction::Next), 200, 0),
        ] {
            let window = page_window(dir, Some(cursor), count).unwrap();
            assert_eq!(window.len(), count as u64);
        }
    }

    #[tokio::test]
    async fn test_initial_page_enables_prev() {
        let mut viewer = viewer();
        viewer.apply_response(
            None,
            ReadResponse {
                lines: lines(30),
                next_cursor: Some(500),
                has_more: true,
                has_prev: None,
                has_next: None,
            },
        );

        assert_eq!(viewer.window, Some(PageWindow { start: 470, end: 500 }));
        assert!(viewer.can_prev);
        assert!(viewer.can_next);
    }

    #[tokio::test]
    async fn test_explicit_flags_win() {
        let mut viewer = viewer();
        viewer.apply_response(
            Some(Direction::Prev),
            ReadResponse {
                lines: lines(10),
                next_cursor: Some(0),
                has_more: true,
                has_prev: Some(false),
                has_next: Some(true),
            },
        );

        assert!(!viewer.can_prev);
        assert!(viewer.can_next);
        assert_eq!(viewer.window, Some(PageWindow { start: 0, end: 10 }));
    }

    #[tokio::test]
    async fn test_navigation_queries_follow_window() {
        let mut viewer = viewer();
        viewer.apply_response(
            None,
            ReadResponse {
                lines: lines(30),
                next_cursor: Some(500),
                has_more: false,
                has_prev: Some(true),
                has_next: Some(false),
            },
        );

        assert!(viewer.next_page().is_none());
        let query = viewer.prev_page().unwrap();
        assert_eq!(query.cursor, Some(470));
        assert_eq!(query.dir, Some(Direction::Prev));
        assert_eq!(query.tail, 30);
        viewer.unmount();
    }

    #[tokio::test]
    async fn test_switching_source_resets_pagination() {
        let mut viewer = viewer();
        viewer.apply_response(
            Some(Direction::Prev),
            ReadResponse {
                lines: lines(30),
                next_cursor: Some(100),
                has_more: true,
                has_prev: None,
                has_next: None,
            },
        );

        let query = viewer.set_source(LogSource::Interesting);
        assert_eq!(query, LogQuery::latest(LogSource::Interesting, 30));
        assert!(viewer.window.is_none());
        assert!(viewer.direction.is_none());
        assert!(viewer.lines.is_empty());
        assert!(viewer.is_loading());

        let query = viewer.cycle_page_size(true);
        assert_eq!(query, LogQuery::latest(LogSource::Interesting, 50));
        viewer.unmount();
        assert!(!viewer.is_loading());
    }

    #[test]
    fn test_row_tone() {
        let block: LogLine = serde_json::from_value(json!({"event": "waf_block", "status": 403})).unwrap();
        let allow: LogLine = serde_json::from_value(json!({"event": "waf_hit_allow"})).unwrap();
        let upstream: LogLine = serde_json::from_value(json!({"event": "proxy", "status": 502})).unwrap();
        let plain: LogLine = serde_json::from_value(json!({"status": 404})).unwrap();

        assert_eq!(row_tone(&block), Some(RowTone::Block));
        assert_eq!(row_tone(&allow), Some(RowTone::Allow));
        assert_eq!(row_tone(&upstream), Some(RowTone::ServerError));
        assert_eq!(row_tone(&plain), None);
    }
}
