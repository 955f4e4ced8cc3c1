//! Rendered terminal output events

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Category of an output line, used by front ends for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// Echo of a submitted command
    Command,
    /// Command output from the backend
    Output,
    /// Assistant response
    Ai,
    /// Scan progress
    Progress,
    System,
    Info,
    Success,
    Warning,
    Error,
}

/// One line in the session's output log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputLine {
    pub kind: OutputKind,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl OutputLine {
    /// Create line stamped with the current local time
    pub fn new(kind: OutputKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            timestamp: Local::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(OutputKind::System, content)
    }

    pub fn info(content: impl Into<String>) -> Self {
        Self::new(OutputKind::Info, content)
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self::new(OutputKind::Success, content)
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self::new(OutputKind::Warning, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(OutputKind::Error, content)
    }
}

/// Event delivered to session subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A line was appended to the output log
    Line(OutputLine),
    /// The user asked for the screen to be cleared
    ClearScreen,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_constructors() {
        let line = OutputLine::warning("Connection lost");
        assert_eq!(line.kind, OutputKind::Warning);
        assert_eq!(line.content, "Connection lost");
    }

    #[test]
    fn test_lines_are_time_ordered() {
        let first = OutputLine::info("a");
        let second = OutputLine::info("b");
        assert!(first.timestamp <= second.timestamp);
    }
}
