use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Minimal multi-line text buffer with a cursor, used by the raw editors and
/// the cache table's field input.
#[derive(Debug, Clone)]
pub struct TextBuffer {
    lines: Vec<String>,
    row: usize,
    /// Cursor column in chars, not bytes.
    col: usize,
    single_line: bool,
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            row: 0,
            col: 0,
            single_line: false,
        }
    }

    pub fn single_line(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.single_line = true;
        buffer.set_text(text);
        buffer.move_end();
        buffer
    }

    pub fn set_text(&mut self, text: &str) {
        self.lines = text.split('\n').map(String::from).collect();
        if self.single_line && self.lines.len() > 1 {
            self.lines = vec![self.lines.join(" ")];
        }
        self.row = self.row.min(self.lines.len() - 1);
        self.col = self.col.min(self.line_len(self.row));
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines[row].chars().count()
    }

    fn byte_index(&self, row: usize, col: usize) -> usize {
        self.lines[row]
            .char_indices()
            .nth(col)
            .map(|(i, _)| i)
            .unwrap_or(self.lines[row].len())
    }

    pub fn insert_char(&mut self, c: char) {
        let idx = self.byte_index(self.row, self.col);
        self.lines[self.row].insert(idx, c);
        self.col += 1;
    }

    pub fn insert_newline(&mut self) {
        if self.single_line {
            return;
        }
        let idx = self.byte_index(self.row, self.col);
        let rest = self.lines[self.row].split_off(idx);
        self.lines.insert(self.row + 1, rest);
        self.row += 1;
        self.col = 0;
    }

    pub fn backspace(&mut self) {
        if self.col > 0 {
            let idx = self.byte_index(self.row, self.col - 1);
            self.lines[self.row].remove(idx);
            self.col -= 1;
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len(self.row);
            self.lines[self.row].push_str(&line);
        }
    }

    pub fn delete(&mut self) {
        if self.col < self.line_len(self.row) {
            let idx = self.byte_index(self.row, self.col);
            self.lines[self.row].remove(idx);
        } else if self.row + 1 < self.lines.len() {
            let next = self.lines.remove(self.row + 1);
            self.lines[self.row].push_str(&next);
        }
    }

    pub fn move_left(&mut self) {
        if self.col > 0 {
            self.col -= 1;
        } else if self.row > 0 {
            self.row -= 1;
            self.col = self.line_len(self.row);
        }
    }

    pub fn move_right(&mut self) {
        if self.col < self.line_len(self.row) {
            self.col += 1;
        } else if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn move_down(&mut self) {
        if self.row + 1 < self.lines.len() {
            self.row += 1;
            self.col = self.col.min(self.line_len(self.row));
        }
    }

    pub fn move_home(&mut self) {
        self.col = 0;
    }

    pub fn move_end(&mut self) {
        self.col = self.line_len(self.row);
    }

    /// Apply an editing key. Returns true when the text changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => {
                self.insert_char(c);
                true
            }
            KeyCode::Tab if !self.single_line => {
                self.insert_char('\t');
                true
            }
            KeyCode::Enter if !self.single_line => {
                self.insert_newline();
                true
            }
            KeyCode::Backspace => {
                self.backspace();
                true
            }
            KeyCode::Delete => {
                self.delete();
                true
            }
            KeyCode::Left => {
                self.move_left();
                false
            }
            KeyCode::Right => {
                self.move_right();
                false
            }
            KeyCode::Up => {
                self.move_up();
                false
            }
            KeyCode::Down => {
                self.move_down();
                false
            }
            KeyCode::Home => {
                self.move_home();
                false
            }
            KeyCode::End => {
                self.move_end();
                false
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_typing_and_newlines() {
        let mut buffer = TextBuffer::new();
        for c in "/healthz".chars() {
            buffer.handle_key(key(KeyCode::Char(c)));
        }
        buffer.handle_key(key(KeyCode::Enter));
        buffer.handle_key(key(KeyCode::Char('/')));

        assert_eq!(buffer.text(), "/healthz\n/");
        assert_eq!(buffer.cursor(), (1, 1));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buffer = TextBuffer::new();
        buffer.set_text("ab\ncd");
        buffer.move_down();
        buffer.move_home();
        buffer.backspace();

        assert_eq!(buffer.text(), "abcd");
        assert_eq!(buffer.cursor(), (0, 2));
    }

    #[test]
    fn test_multibyte_cursor() {
        let mut buffer = TextBuffer::new();
        buffer.set_text("ルール");
        buffer.move_end();
        buffer.move_left();
        buffer.insert_char('x');
        assert_eq!(buffer.text(), "ルーxル");

        buffer.delete();
        assert_eq!(buffer.text(), "ルーx");
    }

    #[test]
    fn test_single_line_ignores_enter() {
        let mut buffer = TextBuffer::single_line("GET");
        assert!(!buffer.handle_key(key(KeyCode::Enter)));
        buffer.handle_key(key(KeyCode::Char(',')));
        assert_eq!(buffer.text(), "GET,");
    }

    #[test]
    fn test_control_keys_are_not_text() {
        let mut buffer = TextBuffer::new();
        let ctrl_s = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(!buffer.handle_key(ctrl_s));
        assert_eq!(buffer.text(), "");
    }
}
