//! Command history with a recall cursor
//!
//! Entries are append-only. The cursor counts back from the newest entry:
//! `None` means "not browsing", `Some(0)` is the most recent entry.

use chrono::{DateTime, Local};

/// One submitted command
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub text: String,
    pub submitted_at: DateTime<Local>,
}

/// Append-only history with bidirectional recall
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    entries: Vec<HistoryEntry>,
    cursor: Option<usize>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission and stop browsing
    pub fn append(&mut self, text: impl Into<String>) {
        self.entries.push(HistoryEntry {
            text: text.into(),
            submitted_at: Local::now(),
        });
        self.cursor = None;
    }

    /// Step to an older entry
    ///
    /// Returns `None` when already at the oldest entry (or history is empty);
    /// the caller keeps its current input in that case.
    pub fn recall_previous(&mut self) -> Option<&str> {
        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.entries.len() {
            return None;
        }
        self.cursor = Some(next);
        Some(self.entry_at_cursor(next))
    }

    /// Step to a newer entry
    ///
    /// Leaving the newest entry stops browsing and yields an empty string.
    /// Returns `None` when not browsing.
    pub fn recall_next(&mut self) -> Option<&str> {
        match self.cursor {
            Some(0) => {
                self.cursor = None;
                Some("")
            }
            Some(c) => {
                self.cursor = Some(c - 1);
                Some(self.entry_at_cursor(c - 1))
            }
            None => None,
        }
    }

    /// Cursor as a signed index, -1 when not browsing
    pub fn cursor(&self) -> isize {
        self.cursor.map_or(-1, |c| c as isize)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    fn entry_at_cursor(&self, cursor: usize) -> &str {
        &self.entries[self.entries.len() - 1 - cursor].text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(n: usize) -> HistoryNavigator {
        let mut history = HistoryNavigator::new();
        for i in 0..n {
            history.append(format!("cmd{}", i));
        }
        history
    }

    #[test]
    fn test_full_walk_returns_to_not_browsing() {
        for n in [0usize, 1, 3] {
            let mut history = history_of(n);

            for _ in 0..n {
                assert!(history.recall_previous().is_some());
            }
            assert_eq!(history.cursor(), n as isize - 1);

            let mut last = None;
            for _ in 0..n {
                last = history.recall_next().map(str::to_owned);
            }
            assert_eq!(history.cursor(), -1, "n = {}", n);
            if n > 0 {
                assert_eq!(last.as_deref(), Some(""), "n = {}", n);
            }
        }
    }

    #[test]
    fn test_recall_order_is_newest_first() {
        let mut history = history_of(3);
        assert_eq!(history.recall_previous(), Some("cmd2"));
        assert_eq!(history.recall_previous(), Some("cmd1"));
        assert_eq!(history.recall_previous(), Some("cmd0"));
        assert_eq!(history.recall_next(), Some("cmd1"));
        assert_eq!(history.recall_next(), Some("cmd2"));
        assert_eq!(history.recall_next(), Some(""));
    }

    #[test]
    fn test_previous_stops_at_oldest() {
        let mut history = history_of(1);
        assert_eq!(history.recall_previous(), Some("cmd0"));
        assert_eq!(history.recall_previous(), None);
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn test_next_without_browsing_is_noop() {
        let mut history = history_of(2);
        assert_eq!(history.recall_next(), None);
        assert_eq!(history.cursor(), -1);
    }

    #[test]
    fn test_empty_history() {
        let mut history = HistoryNavigator::new();
        assert_eq!(history.recall_previous(), None);
        assert_eq!(history.recall_next(), None);
        assert_eq!(history.cursor(), -1);
        assert!(history.is_empty());
    }

    #[test]
    fn test_append_resets_cursor_and_keeps_entries() {
        let mut history = history_of(2);
        history.recall_previous();
        history.append("whoami");
        assert_eq!(history.cursor(), -1);
        let texts: Vec<_> = history.entries().iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["cmd0", "cmd1", "whoami"]);
    }
}
