//! Command classification
//!
//! Decides whether submitted text is a local built-in, a natural-language
//! query for the backend assistant, or a raw command to execute. Rules are
//! evaluated in a fixed order and the first match wins:
//!
//! 1. exact built-in (`clear`, `help`, `status`)
//! 2. explicit query marker prefix (`ai:`)
//! 3. indicator word plus more than two tokens
//! 4. raw command

/// Reserved prefix forcing a natural-language query
pub const QUERY_MARKER: &str = "ai:";

/// Words suggesting the user is describing intent rather than typing a command
pub const NL_INDICATORS: &[&str] = &["scan", "find", "show", "list", "what", "how", "check", "test"];

/// Commands resolved locally, never sent to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltIn {
    Clear,
    Help,
    Status,
}

impl BuiltIn {
    pub const ALL: [BuiltIn; 3] = [BuiltIn::Clear, BuiltIn::Help, BuiltIn::Status];

    pub fn name(self) -> &'static str {
        match self {
            BuiltIn::Clear => "clear",
            BuiltIn::Help => "help",
            BuiltIn::Status => "status",
        }
    }

    fn from_exact(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == text)
    }
}

/// Result of classifying one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    BuiltIn(BuiltIn),
    /// Query text with any marker stripped
    AiQuery(String),
    /// Raw command text
    Execute(String),
}

/// Classify submitted text
///
/// Returns `None` for empty or whitespace-only input.
pub fn classify(text: &str) -> Option<Classification> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(builtin) = BuiltIn::from_exact(text) {
        return Some(Classification::BuiltIn(builtin));
    }

    if let Some(query) = text.strip_prefix(QUERY_MARKER) {
        return Some(Classification::AiQuery(query.trim().to_string()));
    }

    if looks_like_natural_language(text) {
        return Some(Classification::AiQuery(text.to_string()));
    }

    Some(Classification::Execute(text.to_string()))
}

/// Indicator word (case-insensitive substring) and more than two tokens
pub fn looks_like_natural_language(text: &str) -> bool {
    if text.split_whitespace().count() <= 2 {
        return false;
    }
    let lower = text.to_lowercase();
    NL_INDICATORS.iter().any(|word| lower.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_is_unclassified() {
        assert_eq!(classify(""), None);
        assert_eq!(classify("   \t "), None);
    }

    #[test]
    fn test_builtins_resolve_locally() {
        assert_eq!(classify("clear"), Some(Classification::BuiltIn(BuiltIn::Clear)));
        assert_eq!(classify("  help "), Some(Classification::BuiltIn(BuiltIn::Help)));
        assert_eq!(classify("status"), Some(Classification::BuiltIn(BuiltIn::Status)));
    }

    #[test]
    fn test_builtin_match_is_exact() {
        // Not the built-in itself, so it falls through to the raw command rule
        assert_eq!(
            classify("status --verbose"),
            Some(Classification::Execute("status --verbose".into()))
        );
        assert_eq!(classify("Clear"), Some(Classification::Execute("Clear".into())));
    }

    #[test]
    fn test_marker_strips_prefix() {
        assert_eq!(
            classify("ai: explain this nmap output"),
            Some(Classification::AiQuery("explain this nmap output".into()))
        );
        assert_eq!(classify("ai:"), Some(Classification::AiQuery(String::new())));
    }

    #[test]
    fn test_marker_outranks_heuristic() {
        // Would also match the heuristic; the marker must still be stripped
        assert_eq!(
            classify("ai:scan the whole subnet"),
            Some(Classification::AiQuery("scan the whole subnet".into()))
        );
    }

    #[test]
    fn test_marker_must_be_prefix() {
        assert_eq!(
            classify("echo ai:hello"),
            Some(Classification::Execute("echo ai:hello".into()))
        );
    }

    #[test]
    fn test_heuristic_needs_indicator_and_three_tokens() {
        assert_eq!(
            classify("Show me open ports"),
            Some(Classification::AiQuery("Show me open ports".into()))
        );
        // Two tokens only
        assert_eq!(
            classify("scan 10.0.0.1"),
            Some(Classification::Execute("scan 10.0.0.1".into()))
        );
        // No indicator
        assert_eq!(
            classify("nmap -sV 10.0.0.1"),
            Some(Classification::Execute("nmap -sV 10.0.0.1".into()))
        );
    }

    #[test]
    fn test_indicator_matches_as_substring() {
        // "listen" contains "list"
        assert!(looks_like_natural_language("netstat listen all"));
        assert!(looks_like_natural_language("HOW do i pivot"));
    }

    #[test]
    fn test_rule_boundaries() {
        use Classification::{AiQuery, Execute};
        let ai = |s: &str| Some(AiQuery(s.to_string()));
        let exec = |s: &str| Some(Execute(s.to_string()));

        let cases = [
            // token count: two is a command, three is a query
            ("check ports", exec("check ports")),
            ("check ports now", ai("check ports now")),
            // tabs and runs of spaces separate tokens too
            ("scan\t10.0.0.1", exec("scan\t10.0.0.1")),
            ("scan\tthe\tsubnet", ai("scan\tthe\tsubnet")),
            ("list   -a    /tmp", ai("list   -a    /tmp")),
            // indicator inside a longer word still counts
            ("testdisk /dev/sda1 --log", ai("testdisk /dev/sda1 --log")),
            ("whatever you say", ai("whatever you say")),
            ("testdisk /dev/sda1", exec("testdisk /dev/sda1")),
            // marker followed only by whitespace
            ("ai:   ", ai("")),
            ("ai:\t", ai("")),
            ("  ai: \t ", ai("")),
            // built-ins win over the heuristic and must be exact
            ("help", Some(Classification::BuiltIn(BuiltIn::Help))),
            ("help me find hosts", ai("help me find hosts")),
            ("status now", exec("status now")),
            ("\n", None),
        ];

        for (input, expected) in cases {
            assert_eq!(classify(input), expected, "input {:?}", input);
            assert_eq!(classify(input), classify(input), "input {:?}", input);
        }
    }
}
