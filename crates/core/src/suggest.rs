//! Command suggestions for partial input

/// Maximum suggestions returned
pub const MAX_SUGGESTIONS: usize = 5;

/// Minimum input length before suggestions appear
const MIN_INPUT_LEN: usize = 2;

/// Inputs longer than this also match natural-language templates
const TEMPLATE_MIN_LEN: usize = 5;

/// Keyword rules, evaluated in declared order
const KEYWORD_RULES: &[(&str, &[&str])] = &[
    (
        "scan",
        &[
            "nmap -sS -O target_ip",
            "masscan -p1-1000 target_ip",
            "nmap -sV --script vuln target_ip",
        ],
    ),
    (
        "exploit",
        &[
            "msfconsole",
            "searchsploit keyword",
            "use exploit/multi/handler",
        ],
    ),
    (
        "brute",
        &[
            "hydra -l admin -P passwords.txt ssh://target_ip",
            "john --wordlist=rockyou.txt hashes.txt",
        ],
    ),
    (
        "web",
        &[
            "dirb http://target_ip",
            "sqlmap -u \"http://target_ip/page?id=1\"",
            "nikto -h target_ip",
        ],
    ),
];

const NL_TEMPLATES: &[&str] = &[
    "scan network for vulnerabilities",
    "enumerate open ports on target",
    "start metasploit framework",
    "brute force SSH credentials",
    "scan web application for SQL injection",
];

/// Candidate commands for the current partial input
///
/// A keyword rule fires when the keyword appears in the input, or when the
/// input is the start of the keyword still being typed (`sc` -> `scan`).
/// Rule candidates come first, then matching templates. No de-duplication.
pub fn suggest(input: &str) -> Vec<String> {
    let len = input.chars().count();
    if len < MIN_INPUT_LEN {
        return Vec::new();
    }

    let lower = input.to_lowercase();
    let typed = lower.trim();
    let mut out: Vec<&str> = Vec::new();

    for (keyword, candidates) in KEYWORD_RULES {
        let partial = typed.chars().count() >= MIN_INPUT_LEN && keyword.starts_with(typed);
        if lower.contains(keyword) || partial {
            out.extend_from_slice(candidates);
        }
    }

    if len > TEMPLATE_MIN_LEN {
        out.extend(
            NL_TEMPLATES
                .iter()
                .copied()
                .filter(|t| t.to_lowercase().contains(&lower)),
        );
    }

    out.into_iter()
        .take(MAX_SUGGESTIONS)
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_input_has_no_suggestions() {
        assert!(suggest("").is_empty());
        assert!(suggest("s").is_empty());
    }

    #[test]
    fn test_padding_does_not_count_toward_partial_keyword() {
        assert!(suggest("s ").is_empty());
        assert!(suggest(" e").is_empty());
        assert!(suggest("   b").is_empty());
        assert_eq!(suggest(" ex ")[0], "msfconsole");
    }

    #[test]
    fn test_sc_matches_scan_rule() {
        let got = suggest("sc");
        assert!(!got.is_empty());
        assert!(got.len() <= MAX_SUGGESTIONS);
        assert_eq!(got[0], "nmap -sS -O target_ip");
    }

    #[test]
    fn test_full_keyword_matches() {
        let got = suggest("scan");
        assert_eq!(got.len(), 3);
        assert_eq!(got[2], "nmap -sV --script vuln target_ip");
    }

    #[test]
    fn test_unrelated_input_has_no_suggestions() {
        assert!(suggest("ls").is_empty());
        assert!(suggest("cat /etc/passwd").is_empty());
    }

    #[test]
    fn test_keyword_is_case_insensitive_substring() {
        let got = suggest("WebApp");
        assert_eq!(got[0], "dirb http://target_ip");
    }

    #[test]
    fn test_long_input_adds_templates() {
        let got = suggest("scan network");
        assert_eq!(
            got,
            vec![
                "nmap -sS -O target_ip",
                "masscan -p1-1000 target_ip",
                "nmap -sV --script vuln target_ip",
                "scan network for vulnerabilities",
            ]
        );
    }

    #[test]
    fn test_truncated_to_five_without_dedup() {
        // "scan" and "web" rules plus a template: 3 + 3 + 1 > 5
        let got = suggest("scan web");
        assert_eq!(got.len(), MAX_SUGGESTIONS);
        assert_eq!(got[3], "dirb http://target_ip");
    }

    #[test]
    fn test_template_only_match() {
        let got = suggest("metasploit");
        assert_eq!(got, vec!["start metasploit framework"]);
    }

    #[test]
    fn test_template_needs_more_than_five_chars() {
        // "start" is a template substring but only five characters long
        assert!(suggest("start").is_empty());
    }
}
