//! Pattern checks run against the Conductor's reply before it is returned.

use regex::{RegexSet, RegexSetBuilder};
use std::sync::OnceLock;

/// Self-harm phrasing that aborts the request.
pub const BANNED_PATTERNS: &[&str] = &[r"\bkill yourself\b", r"\bsuicide\b", r"\bharm yourself\b"];

/// Directive phrasing that is logged but allowed through.
pub const ADVISORY_PATTERNS: &[&str] = &[r"\byou must\b", r"\byou should\b"];

fn case_insensitive_set(patterns: &[&str]) -> RegexSet {
    RegexSetBuilder::new(patterns)
        .case_insensitive(true)
        .build()
        .expect("static safety patterns are valid regexes")
}

fn banned() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| case_insensitive_set(BANNED_PATTERNS))
}

fn advisory() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| case_insensitive_set(ADVISORY_PATTERNS))
}

/// Returns false if `text` contains any banned phrase (case-insensitive, whole words).
pub fn validate_safety(text: &str) -> bool {
    !banned().is_match(text)
}

/// Advisory patterns found in `text`, in declaration order. Empty when nothing matched.
pub fn flag_content(text: &str) -> Vec<&'static str> {
    advisory()
        .matches(text)
        .into_iter()
        .map(|i| ADVISORY_PATTERNS[i])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banned_phrases_fail() {
        assert!(!validate_safety("I want to kill yourself"));
        assert!(!validate_safety("KILL YOURSELF"));
        assert!(!validate_safety("Thinking about suicide lately."));
        assert!(!validate_safety("Please don't harm yourself, okay?"));
    }

    #[test]
    fn benign_text_passes() {
        assert!(validate_safety("I had a great day"));
        assert!(validate_safety(""));
    }

    #[test]
    fn matching_is_whole_word() {
        assert!(validate_safety("what a killjoyself move"));
        assert!(validate_safety("suicidesquad marathon tonight"));
        assert!(validate_safety("skill yourself up with a course"));
    }

    #[test]
    fn flags_directive_language() {
        assert_eq!(flag_content("You must call your doctor"), vec![r"\byou must\b"]);
        assert_eq!(
            flag_content("you should rest, and YOU MUST drink water"),
            vec![r"\byou must\b", r"\byou should\b"]
        );
    }

    #[test]
    fn no_flags_for_plain_text() {
        assert!(flag_content("It's sunny today").is_empty());
        assert!(flag_content("you mustard fan").is_empty());
    }
}
