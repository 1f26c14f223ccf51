use std::fmt;

use zeroize::Zeroize;

/// Character shown in place of each typed password character.
pub const MASK_CHAR: char = '*';

/// Single-line input surface.
///
/// `buffer` is what the user sees. While masking is enabled every typed
/// character goes to the hidden `masked` accumulator and a [`MASK_CHAR`] is
/// appended to `buffer` instead, so both always hold the same number of
/// characters.
#[derive(Default)]
pub struct LineEditor {
    buffer: String,
    cursor: usize,
    masked: Option<String>,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The visible text (mask characters while a password is being typed).
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position as a byte offset into [`buffer`](Self::buffer).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_masked(&self) -> bool {
        self.masked.is_some()
    }

    /// Number of hidden characters captured so far, if masking.
    pub fn masked_len(&self) -> Option<usize> {
        self.masked.as_ref().map(|m| m.chars().count())
    }

    /// Switch password capture on. Any text already in the buffer is dropped.
    pub fn begin_masking(&mut self) {
        self.clear();
        self.masked = Some(String::new());
    }

    pub fn end_masking(&mut self) {
        self.clear();
        self.masked = None;
    }

    pub fn insert_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        if let Some(masked) = self.masked.as_mut() {
            masked.push(c);
            self.buffer.push(MASK_CHAR);
            self.cursor = self.buffer.len();
            return;
        }
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_text(&mut self, s: &str) {
        for c in s.chars() {
            self.insert_char(c);
        }
    }

    pub fn delete_back(&mut self) {
        if let Some(masked) = self.masked.as_mut() {
            if masked.pop().is_some() {
                self.buffer.pop();
            }
            self.cursor = self.buffer.len();
            return;
        }
        if self.cursor > 0 {
            let prev = self.prev_char_boundary();
            self.buffer.drain(prev..self.cursor);
            self.cursor = prev;
        }
    }

    pub fn delete_forward(&mut self) {
        if self.masked.is_some() {
            return;
        }
        if self.cursor < self.buffer.len() {
            let next = self.next_char_boundary();
            self.buffer.drain(self.cursor..next);
        }
    }

    pub fn delete_word_back(&mut self) {
        if self.masked.is_some() || self.cursor == 0 {
            return;
        }
        let mut pos = self.cursor;
        while pos > 0 && self.buffer.as_bytes()[pos - 1] == b' ' {
            pos -= 1;
        }
        while pos > 0 && self.buffer.as_bytes()[pos - 1] != b' ' {
            pos -= 1;
        }
        self.buffer.drain(pos..self.cursor);
        self.cursor = pos;
    }

    /// Ctrl+U: drop the whole line. In password mode this also drops the
    /// hidden characters.
    pub fn kill_line(&mut self) {
        if let Some(masked) = self.masked.as_mut() {
            masked.zeroize();
        }
        self.buffer.clear();
        self.cursor = 0;
    }

    pub fn move_left(&mut self) {
        if self.masked.is_none() && self.cursor > 0 {
            self.cursor = self.prev_char_boundary();
        }
    }

    pub fn move_right(&mut self) {
        if self.masked.is_none() && self.cursor < self.buffer.len() {
            self.cursor = self.next_char_boundary();
        }
    }

    pub fn move_home(&mut self) {
        if self.masked.is_none() {
            self.cursor = 0;
        }
    }

    pub fn move_end(&mut self) {
        self.cursor = self.buffer.len();
    }

    /// Replace the visible buffer wholesale. Ignored while masking.
    pub fn set_buffer(&mut self, s: &str) {
        if self.masked.is_some() {
            return;
        }
        self.buffer = s.to_string();
        self.cursor = self.buffer.len();
    }

    /// Take the submitted value and clear both buffers.
    ///
    /// Returns the hidden plaintext in password mode, the visible text
    /// otherwise. Masking stays enabled; the caller decides when it ends.
    pub fn submit(&mut self) -> String {
        let value = match self.masked.as_mut() {
            Some(masked) => std::mem::take(masked),
            None => self.buffer.clone(),
        };
        self.buffer.clear();
        self.cursor = 0;
        value
    }

    fn clear(&mut self) {
        if let Some(masked) = self.masked.as_mut() {
            masked.zeroize();
        }
        self.buffer.clear();
        self.cursor = 0;
    }

    fn prev_char_boundary(&self) -> usize {
        let mut pos = self.cursor - 1;
        while !self.buffer.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    fn next_char_boundary(&self) -> usize {
        let mut pos = self.cursor + 1;
        while pos < self.buffer.len() && !self.buffer.is_char_boundary(pos) {
            pos += 1;
        }
        pos
    }
}

impl fmt::Debug for LineEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineEditor")
            .field("buffer", &self.buffer)
            .field("cursor", &self.cursor)
            .field("masked_len", &self.masked_len())
            .finish()
    }
}

impl Drop for LineEditor {
    fn drop(&mut self) {
        if let Some(masked) = self.masked.as_mut() {
            masked.zeroize();
        }
    }
}
