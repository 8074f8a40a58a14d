//! Multi-line text buffer backing the container config editor.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::TextInputState;

/// Newline-separated text with a byte cursor.
///
/// Horizontal editing reuses [`TextInputState`] semantics on the whole
/// buffer; vertical movement keeps the display column where possible.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextAreaState {
    buffer: TextInputState,
}

impl TextAreaState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        self.buffer.input()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.buffer.set_input(text);
    }

    pub fn line_count(&self) -> usize {
        self.text().split('\n').count()
    }

    /// Zero-based line index and display column of the cursor.
    pub fn cursor_line_and_column(&self) -> (usize, u16) {
        let before = &self.text()[..self.buffer.cursor()];
        let line = before.matches('\n').count();
        let line_start = before.rfind('\n').map(|index| index + 1).unwrap_or(0);
        let column = u16::try_from(before[line_start..].width()).unwrap_or(u16::MAX);
        (line, column)
    }

    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert_char(c);
    }

    pub fn insert_newline(&mut self) {
        self.buffer.insert_char('\n');
    }

    pub fn backspace(&mut self) {
        self.buffer.backspace();
    }

    pub fn move_left(&mut self) {
        self.buffer.move_left();
    }

    pub fn move_right(&mut self) {
        self.buffer.move_right();
    }

    /// Move to the previous line; returns `false` on the first line.
    pub fn move_up(&mut self) -> bool {
        let (line, column) = self.cursor_line_and_column();
        if line == 0 {
            return false;
        }
        self.move_to(line - 1, column);
        true
    }

    /// Move to the next line; returns `false` on the last line.
    pub fn move_down(&mut self) -> bool {
        let (line, column) = self.cursor_line_and_column();
        if line + 1 >= self.line_count() {
            return false;
        }
        self.move_to(line + 1, column);
        true
    }

    fn move_to(&mut self, target_line: usize, column: u16) {
        let text = self.text().to_string();
        let line_start: usize = text.split('\n').take(target_line).map(|line| line.len() + 1).sum();
        let line = text.split('\n').nth(target_line).unwrap_or_default();

        let mut offset = 0;
        let mut width = 0u16;
        for character in line.chars() {
            let next = width + u16::try_from(character.width().unwrap_or(0)).unwrap_or(0);
            if next > column {
                break;
            }
            width = next;
            offset += character.len_utf8();
        }

        self.buffer.move_home();
        while self.buffer.cursor() < line_start + offset {
            self.buffer.move_right();
        }
    }
}
