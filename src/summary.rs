//! Transcript summarization.

/// Word budget for the short summary.
pub const SUMMARY_WORD_BUDGET: usize = 60;

/// Truncate `text` to its first `max_words` whitespace-delimited tokens.
///
/// Text within the budget is returned unchanged; truncated text gets a
/// trailing ellipsis marker.
pub fn summarize(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= max_words {
        return text.to_string();
    }
    format!("{}...", words[..max_words].join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_unchanged() {
        let text = "a short voice note\nwith a line break";
        assert_eq!(summarize(text, SUMMARY_WORD_BUDGET), text);
    }

    #[test]
    fn test_empty_text_yields_empty_summary() {
        assert_eq!(summarize("", SUMMARY_WORD_BUDGET), "");
        assert_eq!(summarize("   \n\t ", SUMMARY_WORD_BUDGET), "   \n\t ");
    }

    #[test]
    fn test_exact_budget_is_unchanged() {
        let text = (0..SUMMARY_WORD_BUDGET)
            .map(|i| format!("w{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(summarize(&text, SUMMARY_WORD_BUDGET), text);
    }

    #[test]
    fn test_over_budget_truncates_with_ellipsis() {
        let text = (0..SUMMARY_WORD_BUDGET + 10)
            .map(|i| format!("w{i}"))
            .collect::<Vec<_>>()
            .join(" ");

        let summary = summarize(&text, SUMMARY_WORD_BUDGET);
        assert!(summary.ends_with("..."));

        let expected = (0..SUMMARY_WORD_BUDGET)
            .map(|i| format!("w{i}"))
            .collect::<Vec<_>>()
            .join(" ");
        assert_eq!(summary, format!("{expected}..."));
    }

    #[test]
    fn test_truncation_normalizes_whitespace() {
        let text = "one\n two\t\tthree  four five";
        assert_eq!(summarize(text, 3), "one two three...");
    }
}
