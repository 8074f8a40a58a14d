//! UTF-8 safe single-line text input with cursor management.

use unicode_width::UnicodeWidthStr;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextInputState {
    /// The underlying text buffer
    input: String,
    /// Cursor byte index into `input` (always on a UTF-8 boundary)
    cursor: usize,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_input<S: Into<String>>(&mut self, s: S) {
        self.input = s.into();
        self.cursor = self.input.len();
    }

    /// Terminal columns occupied by the text before the cursor.
    pub fn cursor_columns(&self) -> u16 {
        u16::try_from(self.input[..self.cursor].width()).unwrap_or(u16::MAX)
    }

    /// Move cursor one Unicode scalar to the left.
    pub fn move_left(&mut self) {
        if let Some(previous) = self.input[..self.cursor].chars().next_back() {
            self.cursor -= previous.len_utf8();
        }
    }

    /// Move cursor one Unicode scalar to the right.
    pub fn move_right(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    /// Insert a char at the cursor.
    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Remove the char immediately before the cursor.
    pub fn backspace(&mut self) {
        if let Some(previous) = self.input[..self.cursor].chars().next_back() {
            let start = self.cursor - previous.len_utf8();
            self.input.drain(start..self.cursor);
            self.cursor = start;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_respects_multibyte_boundaries() {
        let mut state = TextInputState::new();
        state.set_input("naïve");
        state.move_left();
        state.move_left();
        state.backspace();
        assert_eq!(state.input(), "nave");
        state.insert_char('ï');
        assert_eq!(state.input(), "naïve");
        assert_eq!(state.cursor_columns(), 3);
    }

    #[test]
    fn movement_clamps_at_edges() {
        let mut state = TextInputState::new();
        state.move_left();
        state.backspace();
        state.move_right();
        assert_eq!(state.cursor(), 0);
        state.set_input("ab");
        state.move_right();
        assert_eq!(state.cursor(), 2);
        state.move_home();
        state.insert_char('x');
        assert_eq!(state.input(), "xab");
    }
}
