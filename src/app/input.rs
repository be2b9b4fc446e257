// stream_reply — Incremental terminal rendering for streamed assistant replies
// Copyright (C) 2025  The stream-reply contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

/// Single-line prompt editor. The cursor is a char index.
#[derive(Debug, Default)]
pub struct InputState {
    text: String,
    cursor: usize,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Hand out the prompt and clear the editor.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    pub fn insert_char(&mut self, c: char) {
        let byte_idx = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_idx, c);
        self.cursor += 1;
    }

    /// Pasted text; line breaks become spaces.
    pub fn insert_str(&mut self, s: &str) {
        for c in s.chars() {
            self.insert_char(if c == '\n' || c == '\r' { ' ' } else { c });
        }
    }

    pub fn delete_char_before(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_idx = char_to_byte_index(&self.text, self.cursor);
        self.text.remove(byte_idx);
    }

    pub fn delete_char_after(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_idx = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_idx);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Text left of the cursor, for placing the terminal cursor.
    pub fn before_cursor(&self) -> &str {
        &self.text[..char_to_byte_index(&self.text, self.cursor)]
    }
}

fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn edits_around_multibyte_chars() {
        let mut input = InputState::new();
        input.insert_str("héllo");
        input.move_left();
        input.move_left();
        input.delete_char_before();
        assert_eq!(input.text(), "hélo");
        assert_eq!(input.before_cursor(), "hé");
        input.delete_char_after();
        assert_eq!(input.text(), "héo");
    }

    #[test]
    fn paste_flattens_newlines() {
        let mut input = InputState::new();
        input.insert_str("a\nb\r\nc");
        assert_eq!(input.text(), "a b  c");
    }

    #[test]
    fn take_clears_and_resets_cursor() {
        let mut input = InputState::new();
        input.insert_str("hi");
        assert_eq!(input.take(), "hi");
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let mut input = InputState::new();
        input.insert_str("   ");
        assert!(input.is_empty());
    }

    #[test]
    fn cursor_movement_is_clamped() {
        let mut input = InputState::new();
        input.move_left();
        input.insert_char('x');
        input.move_right();
        input.move_right();
        assert_eq!(input.cursor(), 1);
        input.move_home();
        assert_eq!(input.before_cursor(), "");
    }
}
