/// In-memory command history (oldest first) with a recall cursor.
///
/// The cursor is parked one past the newest entry, which stands for the
/// empty buffer.
#[derive(Debug, Default)]
pub struct HistoryStore {
    entries: Vec<String>,
    cursor: usize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a submitted command line. Blank lines are ignored.
    pub fn push(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.entries.push(line.to_string());
        self.cursor = self.entries.len();
    }

    /// Step back one entry. Saturates at the oldest entry; `None` only when
    /// nothing has been recorded yet.
    pub fn recall_previous(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        self.cursor = self.cursor.saturating_sub(1);
        Some(&self.entries[self.cursor])
    }

    /// Step forward one entry. Past the newest entry this yields the empty
    /// buffer and stays there.
    pub fn recall_next(&mut self) -> &str {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
            &self.entries[self.cursor]
        } else {
            self.cursor = self.entries.len();
            ""
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
