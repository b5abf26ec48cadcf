//! Multi-line input buffer.
//!
//! The cursor is a character index, so editing is safe for any UTF-8 text.

/// Editable text with a cursor.
#[derive(Debug, Clone, Default)]
pub struct InputBox {
    text: String,
    /// Cursor position in characters.
    cursor: usize,
}

impl InputBox {
    /// Create an empty input box.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor position in characters.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Check if the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole buffer and move the cursor to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.char_count();
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Insert a line break at the cursor position.
    pub fn newline(&mut self) {
        self.insert_char('\n');
    }

    /// Delete the character before the cursor.
    pub fn delete_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Delete the character at the cursor.
    pub fn delete_char_forward(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Delete back to the previous word boundary.
    pub fn delete_word(&mut self) {
        while self.cursor > 0 && self.char_before_cursor().is_some_and(char::is_whitespace) {
            self.delete_char();
        }
        while self.cursor > 0 && self.char_before_cursor().is_some_and(|c| !c.is_whitespace()) {
            self.delete_char();
        }
    }

    /// Move cursor left.
    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_cursor_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    /// Move cursor to the start of the current line.
    pub fn move_cursor_line_start(&mut self) {
        while self.cursor > 0 && self.char_before_cursor() != Some('\n') {
            self.cursor -= 1;
        }
    }

    /// Move cursor to the end of the current line.
    pub fn move_cursor_line_end(&mut self) {
        let len = self.char_count();
        while self.cursor < len && self.text.chars().nth(self.cursor) != Some('\n') {
            self.cursor += 1;
        }
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Number of lines in the buffer. An empty buffer has one line.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    /// Rendered height including the border. Grows without limit.
    #[must_use]
    pub fn height(&self) -> usize {
        self.line_count() + 2
    }

    /// Cursor as `(row, column)` within the text, both zero-based.
    #[must_use]
    pub fn cursor_position(&self) -> (usize, usize) {
        let before: String = self.text.chars().take(self.cursor).collect();
        let row = before.matches('\n').count();
        let col = before
            .rsplit('\n')
            .next()
            .map_or(0, |line| line.chars().count());
        (row, col)
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn char_before_cursor(&self) -> Option<char> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.text.chars().nth(i))
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map_or(self.text.len(), |(i, _)| i)
    }
}
