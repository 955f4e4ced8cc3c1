//! Output line and prompt rendering

use crossterm::style::{Color, Stylize};
use kaliterm_core::{OutputKind, OutputLine};

/// Timestamped plain text for one output line
pub fn format_line(line: &OutputLine) -> String {
    format!("[{}] {}", line.timestamp.format("%H:%M:%S"), line.content)
}

/// Output line with its kind's color, ready to print
///
/// `newline` replaces embedded line breaks (`\r\n` in raw mode).
pub fn styled_line(line: &OutputLine, newline: &str) -> String {
    let text = format_line(line).replace('\n', newline);
    match color_for(line.kind) {
        Some(color) => text.with(color).to_string(),
        None => text,
    }
}

pub fn prompt(path: &str, input: &str) -> String {
    format!("{}$ {}", path, input)
}

/// Dimmed hint showing the first suggestion and how many more exist
pub fn suggestion_hint(suggestions: &[String]) -> Option<String> {
    let first = suggestions.first()?;
    let more = suggestions.len() - 1;
    let hint = if more > 0 {
        format!("  [Tab: {} (+{})]", first, more)
    } else {
        format!("  [Tab: {}]", first)
    };
    Some(hint.dark_grey().to_string())
}

/// Dimmed marker shown while a request awaits its reply
pub fn waiting_hint() -> String {
    "  [waiting]".dark_grey().to_string()
}

fn color_for(kind: OutputKind) -> Option<Color> {
    match kind {
        OutputKind::Command => Some(Color::White),
        OutputKind::Output => None,
        OutputKind::Ai => Some(Color::Cyan),
        OutputKind::Progress => Some(Color::Blue),
        OutputKind::System => Some(Color::DarkGrey),
        OutputKind::Info => Some(Color::Magenta),
        OutputKind::Success => Some(Color::Green),
        OutputKind::Warning => Some(Color::Yellow),
        OutputKind::Error => Some(Color::Red),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_line_has_timestamp_prefix() {
        let line = OutputLine::info("Scan started: 10.0.0.5");
        let text = format_line(&line);
        assert!(text.starts_with('['));
        assert!(text.ends_with("] Scan started: 10.0.0.5"));
    }

    #[test]
    fn test_multiline_output_uses_given_newline() {
        let line = OutputLine::new(OutputKind::Output, "a\nb");
        assert!(styled_line(&line, "\r\n").ends_with("a\r\nb"));
    }

    #[test]
    fn test_suggestion_hint() {
        assert!(suggestion_hint(&[]).is_none());

        let one = suggestion_hint(&["msfconsole".to_string()]).unwrap();
        assert!(one.contains("[Tab: msfconsole]"));

        let many = vec!["nmap -sS -O target_ip".to_string(), "masscan".to_string()];
        assert!(suggestion_hint(&many).unwrap().contains("(+1)"));
    }

    #[test]
    fn test_waiting_hint() {
        assert!(waiting_hint().contains("[waiting]"));
    }

    #[test]
    fn test_prompt() {
        assert_eq!(prompt("~", "ls"), "~$ ls");
    }
}
