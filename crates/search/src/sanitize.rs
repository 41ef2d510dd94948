//! Raw query hardening.
//!
//! Order matters for idempotence: truncate, strip, then re-split. Every step
//! can only shorten the text, so a second pass finds nothing to change.
//!
//! Runs of whitespace always collapse to one space, whether or not the word
//! cap applies; word boundaries are all later stages look at.

use kinderfrage_core::config::SearchConfig;
use unicode_segmentation::UnicodeSegmentation;

/// Length and word-count caps applied to raw queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sanitizer {
    max_chars: usize,
    min_chars: usize,
    max_words: usize,
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl Sanitizer {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            max_chars: config.max_query_chars,
            min_chars: config.min_query_chars.max(1),
            max_words: config.max_query_words,
        }
    }

    /// Clean a raw query, or `None` when nothing usable is left.
    ///
    /// Characters are counted as extended grapheme clusters so truncation
    /// never splits an umlaut written with a combining mark.
    pub fn sanitize(&self, raw: &str) -> Option<String> {
        let truncated: String = raw.graphemes(true).take(self.max_chars).collect();
        let stripped: String = truncated.chars().filter(|&c| !is_dangerous(c)).collect();

        let words: Vec<&str> = stripped.split_whitespace().collect();
        if words.len() > self.max_words {
            tracing::debug!(words = words.len(), max = self.max_words, "Query word count capped");
        }
        let cleaned = words
            .into_iter()
            .take(self.max_words)
            .collect::<Vec<_>>()
            .join(" ");

        if cleaned.graphemes(true).count() < self.min_chars {
            return None;
        }
        Some(cleaned)
    }
}

/// Sanitize with the stock limits (300 chars, 30 words, min 1 char).
pub fn sanitize(raw: &str) -> Option<String> {
    Sanitizer::default().sanitize(raw)
}

/// Markup characters and non-whitespace control characters are removed
/// outright; whitespace controls are handled by the word split.
fn is_dangerous(c: char) -> bool {
    matches!(c, '<' | '>' | '&') || (c.is_control() && !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_input_passes_through() {
        assert_eq!(sanitize("mein Kind weint").as_deref(), Some("mein Kind weint"));
    }

    #[test]
    fn test_trims_and_collapses_whitespace() {
        assert_eq!(sanitize("  baby \t schläft\nnicht  ").as_deref(), Some("baby schläft nicht"));
    }

    #[test]
    fn test_rejects_blank() {
        assert_eq!(sanitize(""), None);
        assert_eq!(sanitize("   \n\t"), None);
    }

    #[test]
    fn test_rejects_when_only_dangerous_chars() {
        assert_eq!(sanitize("<<&>>"), None);
        assert_eq!(sanitize("\u{0000}\u{0007}"), None);
    }

    #[test]
    fn test_strips_markup_and_controls() {
        assert_eq!(
            sanitize("<script>alert('x')</script> & fieber").as_deref(),
            Some("scriptalert('x')/script fieber")
        );
        assert_eq!(sanitize("zah\u{0000}nen\u{001B}").as_deref(), Some("zahnen"));
    }

    #[test]
    fn test_truncates_to_max_chars() {
        let raw = "a".repeat(500);
        assert_eq!(sanitize(&raw).map(|s| s.len()), Some(300));
    }

    #[test]
    fn test_truncation_respects_graphemes() {
        // "u" + combining diaeresis is one character for the user
        let raw = "u\u{0308}".repeat(301);
        let cleaned = sanitize(&raw).unwrap();
        assert_eq!(cleaned.graphemes(true).count(), 300);
        assert!(cleaned.ends_with("u\u{0308}"));
    }

    #[test]
    fn test_caps_word_count() {
        let raw = (0..40).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ");
        let cleaned = sanitize(&raw).unwrap();
        assert_eq!(cleaned.split(' ').count(), 30);
        assert!(cleaned.ends_with("w29"));
    }

    #[test]
    fn test_custom_min_length() {
        let config = SearchConfig {
            min_query_chars: 3,
            ..SearchConfig::default()
        };
        let sanitizer = Sanitizer::from_config(&config);
        assert_eq!(sanitizer.sanitize("ab"), None);
        assert_eq!(sanitizer.sanitize("abc").as_deref(), Some("abc"));
    }

    proptest! {
        #[test]
        fn prop_idempotent(raw in any::<String>()) {
            let once = sanitize(&raw);
            if let Some(ref cleaned) = once {
                prop_assert_eq!(sanitize(cleaned), once.clone());
            }
        }

        #[test]
        fn prop_output_within_bounds(raw in any::<String>()) {
            if let Some(cleaned) = sanitize(&raw) {
                prop_assert!(cleaned.graphemes(true).count() <= 300);
                prop_assert!(cleaned.split_whitespace().count() <= 30);
                prop_assert!(!cleaned.contains(['<', '>', '&']));
                prop_assert_eq!(cleaned.trim(), cleaned.as_str());
            }
        }
    }
}
