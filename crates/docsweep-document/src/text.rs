// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-text sampling shared by the processors: capped accumulation,
// whitespace normalisation, and the word tokenizer used by spelling rules.

use std::sync::LazyLock;

use docsweep_core::TextSample;
use docsweep_core::error::DocsweepError;
use regex::Regex;

static WORD_PATTERN: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"[A-Za-z']+").ok());

/// Accumulates text lines up to a character budget.
#[derive(Debug)]
pub struct TextCollector {
    buf: String,
    chars: usize,
    max_chars: usize,
}

impl TextCollector {
    pub fn new(max_chars: usize) -> Self {
        Self {
            buf: String::new(),
            chars: 0,
            max_chars,
        }
    }

    /// Append `line` plus a newline. Returns `false` once the budget is spent
    /// and callers should stop extracting.
    pub fn push_line(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return !self.is_full();
        }
        for piece in [line, "\n"] {
            let remaining = self.max_chars.saturating_sub(self.chars);
            if remaining == 0 {
                return false;
            }
            let len = piece.chars().count();
            if len <= remaining {
                self.buf.push_str(piece);
                self.chars += len;
            } else {
                self.buf.extend(piece.chars().take(remaining));
                self.chars = self.max_chars;
                return false;
            }
        }
        !self.is_full()
    }

    pub fn is_full(&self) -> bool {
        self.chars >= self.max_chars
    }

    /// Normalised text collected so far.
    pub fn finish(self) -> String {
        normalize_text(&self.buf)
    }
}

/// Collapse whitespace runs into single spaces and trim the ends.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lowercased alphabetic words (apostrophes kept).
pub fn tokenize_words(s: &str) -> Vec<String> {
    match WORD_PATTERN.as_ref() {
        Some(re) => re
            .find_iter(s)
            .map(|m| m.as_str().to_lowercase())
            .collect(),
        None => Vec::new(),
    }
}

/// Build the sample record for successfully extracted text.
pub fn sample(text: String) -> TextSample {
    TextSample {
        length: text.chars().count(),
        token_count: tokenize_words(&text).len(),
        text,
        extraction_error: None,
    }
}

/// Sample record for a failed extraction.
pub fn failed_sample(err: &DocsweepError) -> TextSample {
    TextSample {
        extraction_error: Some(err.to_string()),
        ..TextSample::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_keeps_apostrophes_and_drops_digits() {
        assert_eq!(
            tokenize_words("Don't panic: 42 Towels!"),
            vec!["don't", "panic", "towels"]
        );
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_text("  a\t\tb\n\nc  "), "a b c");
    }

    #[test]
    fn collector_stops_at_budget() {
        let mut collector = TextCollector::new(8);
        assert!(collector.push_line("abc"));
        assert!(!collector.push_line("defghij"));
        assert!(collector.is_full());
        assert_eq!(collector.finish(), "abc defg");
    }

    #[test]
    fn sample_counts_chars_and_tokens() {
        let s = sample("café au lait".to_owned());
        assert_eq!(s.length, 12);
        assert_eq!(s.token_count, 3);
        assert!(s.extraction_error.is_none());
    }
}
