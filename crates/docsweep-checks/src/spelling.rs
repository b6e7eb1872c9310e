// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spelling rule over the text sample each processor extracts.
//
// Words are checked against a built-in word list for the configured language
// (English is the only one shipped, and the fallback), optionally extended by
// a user allow-list. Severity scales with the number of distinct unknown words:
//   0                      -> INFO, passed
//   1..=fail_threshold     -> WARNING
//   more                   -> ERROR

use std::collections::{BTreeSet, HashSet};
use std::path::Path;
use std::sync::LazyLock;

use docsweep_core::error::Result;
use docsweep_core::{Check, CheckResult, FileArtifact, ScanConfig, Severity};
use docsweep_document::text::tokenize_words;
use tracing::{info, warn};

static ENGLISH: LazyLock<WordList> =
    LazyLock::new(|| WordList::parse(include_str!("../dictionaries/en.txt")));

/// A set of known words, compared case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: HashSet<String>,
}

impl WordList {
    /// Load a newline-separated list. Blank lines and `#` comments are
    /// skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let list = Self::parse(&std::fs::read_to_string(path)?);
        info!(path = %path.display(), words = list.len(), "spelling word list loaded");
        Ok(list)
    }

    fn parse(data: &str) -> Self {
        data.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect()
    }

    /// The shipped list for `language_code` and the code actually used.
    ///
    /// Only English is bundled; any other language falls back to it.
    pub fn builtin(language_code: &str) -> (Self, &'static str) {
        let primary = language_code
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_lowercase();
        if primary != "en" {
            warn!(
                requested = language_code,
                "no built-in word list for language, using English"
            );
        }
        (ENGLISH.clone(), "en")
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Add every word of `other`.
    pub fn extend(&mut self, other: WordList) {
        self.words.extend(other.words);
    }

    /// Whether a lowercased token is a known word, directly or through a
    /// regular inflection (plural, past tense, -ing, -ly, possessive ...).
    /// Surrounding apostrophes are ignored.
    pub fn knows(&self, token: &str) -> bool {
        let word = token.trim_matches('\'');
        if word.is_empty() || self.words.contains(word) {
            return true;
        }
        stems(word).iter().any(|stem| {
            self.words.contains(stem.as_str())
                || stems(stem).iter().any(|s| self.words.contains(s.as_str()))
        })
    }
}

impl<S: AsRef<str>> FromIterator<S> for WordList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            words: iter
                .into_iter()
                .map(|w| w.as_ref().trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }
}

/// Candidate base forms of `word` after removing one regular suffix.
fn stems(word: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut push = |stem: String| {
        if stem.chars().count() >= 2 {
            out.push(stem);
        }
    };

    if let Some(s) = word.strip_suffix("'s") {
        push(s.to_owned());
    }
    for (suffix, replacement) in [("ies", "y"), ("ied", "y"), ("ier", "y"), ("iest", "y"), ("ily", "y")] {
        if let Some(s) = word.strip_suffix(suffix) {
            push(format!("{s}{replacement}"));
        }
    }
    if let Some(s) = word.strip_suffix("es") {
        push(s.to_owned());
    }
    if let Some(s) = word.strip_suffix('s')
        && !s.ends_with('s')
    {
        push(s.to_owned());
    }
    for suffix in ["ed", "ing", "er", "est"] {
        if let Some(s) = word.strip_suffix(suffix) {
            push(s.to_owned());
            push(format!("{s}e"));
            if let Some(single) = undouble(s) {
                push(single);
            }
        }
    }
    for suffix in ["ly", "ness", "ment", "ful", "less", "able"] {
        if let Some(s) = word.strip_suffix(suffix) {
            push(s.to_owned());
        }
    }
    out
}

/// `stopp` -> `stop`: drop a doubled final consonant.
fn undouble(stem: &str) -> Option<String> {
    let mut chars = stem.chars().rev();
    let last = chars.next()?;
    let before = chars.next()?;
    (last == before && !"aeiou".contains(last)).then(|| stem[..stem.len() - last.len_utf8()].to_owned())
}

pub struct SpellingCheck {
    enabled: bool,
    language_code: &'static str,
    words: WordList,
    /// Why the configured allow-list could not be read, if it could not.
    allow_list_error: Option<String>,
    fail_threshold: usize,
    max_reported: usize,
}

impl SpellingCheck {
    /// Build from configuration: the built-in list for `language_code` plus
    /// the words of `spelling_dictionary`, when one is configured. An
    /// unreadable allow-list is logged and reported per file, never fatal.
    pub fn new(config: &ScanConfig) -> Self {
        let (mut words, language_code) = WordList::builtin(&config.language_code);
        let mut allow_list_error = None;
        if config.enable_spelling
            && let Some(path) = &config.spelling_dictionary
        {
            match WordList::load(path) {
                Ok(extra) => words.extend(extra),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "spelling allow-list unavailable");
                    allow_list_error = Some(format!("{}: {err}", path.display()));
                }
            }
        }
        Self::build(config, language_code, words, allow_list_error)
    }

    /// Use exactly `words`, without the built-in list.
    pub fn with_word_list(config: &ScanConfig, words: WordList) -> Self {
        let (_, language_code) = WordList::builtin(&config.language_code);
        Self::build(config, language_code, words, None)
    }

    fn build(
        config: &ScanConfig,
        language_code: &'static str,
        words: WordList,
        allow_list_error: Option<String>,
    ) -> Self {
        Self {
            enabled: config.enable_spelling,
            language_code,
            words,
            allow_list_error,
            fail_threshold: config.spelling_fail_threshold,
            max_reported: config.max_misspellings_reported,
        }
    }
}

impl Default for SpellingCheck {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl Check for SpellingCheck {
    fn name(&self) -> &str {
        "spelling"
    }

    fn applies_to(&self) -> Vec<String> {
        [".docx", ".pptx", ".xlsx", ".pdf"].map(String::from).to_vec()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        if !self.enabled {
            return Ok(
                CheckResult::pass(artifact, self.name(), "Spelling check disabled by config")
                    .with_extra("reason", "disabled"),
            );
        }

        let sample = artifact.facts().text();
        let text = sample.map(|s| s.text.as_str()).unwrap_or("");
        let text_length = sample.map(|s| s.length).unwrap_or(0);
        if text.trim().is_empty() {
            let extraction_error = sample.and_then(|s| s.extraction_error.clone());
            return Ok(CheckResult::fail(
                artifact,
                self.name(),
                Severity::Warning,
                "No text available for spelling check",
            )
            .with_extra("text_length", text_length)
            .with_extra("text_extraction_error", extraction_error.is_some())
            .with_extra("text_extraction_error_detail", extraction_error));
        }

        let tokens = tokenize_words(text);
        let misspelled: BTreeSet<&str> = tokens
            .iter()
            .map(String::as_str)
            .filter(|token| !self.words.knows(token))
            .collect();
        let count = misspelled.len();

        let result = if count == 0 {
            CheckResult::pass(artifact, self.name(), "OK: no misspellings")
        } else if count <= self.fail_threshold {
            CheckResult::fail(
                artifact,
                self.name(),
                Severity::Warning,
                format!("Found {count} misspelling(s)"),
            )
        } else {
            CheckResult::fail(
                artifact,
                self.name(),
                Severity::Error,
                format!(
                    "Found {count} misspelling(s) (over threshold={})",
                    self.fail_threshold
                ),
            )
        };

        let reported: Vec<String> = misspelled
            .iter()
            .take(self.max_reported)
            .map(|w| (*w).to_owned())
            .collect();
        let result = result
            .with_extra("language_code", self.language_code)
            .with_extra("total_tokens", tokens.len())
            .with_extra("unique_misspellings_count", count)
            .with_extra("sample_misspellings", reported)
            .with_extra("text_length", text_length)
            .with_extra("capped_list_at", self.max_reported);
        Ok(match &self.allow_list_error {
            Some(reason) => result.with_extra("allow_list_error", reason.as_str()),
            None => result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use docsweep_core::{DocxFacts, FileReport, FileVerdict, TextSample};

    fn words() -> WordList {
        ["the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "don't"]
            .into_iter()
            .collect()
    }

    fn with_text(text: &str) -> FileArtifact {
        testing::docx(DocxFacts {
            text: TextSample {
                text: text.to_owned(),
                length: text.chars().count(),
                token_count: tokenize_words(text).len(),
                extraction_error: None,
            },
            ..DocxFacts::default()
        })
    }

    fn check(threshold: usize) -> SpellingCheck {
        let config = ScanConfig {
            spelling_fail_threshold: threshold,
            max_misspellings_reported: 2,
            ..ScanConfig::default()
        };
        SpellingCheck::with_word_list(&config, words())
    }

    #[test]
    fn word_list_ignores_case_and_possessives() {
        let list = words();
        assert!(list.knows("dog's"));
        assert!(list.knows("'fox'"));
        assert!(list.knows("don't"));
        assert!(!list.knows("cat"));
        assert_eq!(list.len(), 9);
    }

    #[test]
    fn builtin_list_matches_regular_inflections() {
        let (list, code) = WordList::builtin("en-GB");
        assert_eq!(code, "en");
        for word in [
            "companies", "reviewed", "approved", "stopped", "running", "quickly", "reviewers",
            "documents", "team's",
        ] {
            assert!(list.knows(word), "{word} should be known");
        }
        assert!(!list.knows("recieve"));
        assert!(!list.knows("teh"));
    }

    #[test]
    fn default_configuration_passes_clean_english() {
        let artifact = with_text(
            "The quick brown fox jumps over the lazy dog. The report was reviewed \
             and approved by the team before the meeting.",
        );
        let r = SpellingCheck::new(&ScanConfig::default()).run(&artifact).unwrap();
        assert_eq!(r.severity, Severity::Info);
        assert!(r.passed, "unexpected misspellings: {}", r.extra["sample_misspellings"]);
        assert_eq!(r.extra["language_code"], "en");

        let report = FileReport::from_results(
            artifact.path().to_path_buf(),
            ".docx".into(),
            0,
            vec![r],
        );
        assert_eq!(report.verdict(), FileVerdict::Pass);
    }

    #[test]
    fn unsupported_language_falls_back_to_english() {
        let config = ScanConfig {
            language_code: "xx".into(),
            ..ScanConfig::default()
        };
        let r = SpellingCheck::new(&config)
            .run(&with_text("Please review the attached document"))
            .unwrap();
        assert!(r.passed);
        assert_eq!(r.extra["language_code"], "en");
    }

    #[test]
    fn clean_text_passes() {
        let r = check(10)
            .run(&with_text("The quick brown fox jumps over the lazy dog"))
            .unwrap();
        assert!(r.passed);
        assert_eq!(r.severity, Severity::Info);
        assert_eq!(r.extra["total_tokens"], 9);
        assert_eq!(r.extra["unique_misspellings_count"], 0);
    }

    #[test]
    fn few_misspellings_warn_and_many_fail() {
        let text = "The quikc brwon fox jumsp over the lazy dgo dgo";

        let r = check(10).run(&with_text(text)).unwrap();
        assert_eq!(r.severity, Severity::Warning);
        assert_eq!(r.extra["unique_misspellings_count"], 4);
        // Sorted, capped at max_misspellings_reported.
        assert_eq!(r.extra["sample_misspellings"], serde_json::json!(["brwon", "dgo"]));

        let r = check(3).run(&with_text(text)).unwrap();
        assert_eq!(r.severity, Severity::Error);
        assert!(r.message.contains("over threshold=3"));
    }

    #[test]
    fn empty_text_warns() {
        let r = check(10).run(&with_text("   ")).unwrap();
        assert_eq!(r.severity, Severity::Warning);
        assert_eq!(r.message, "No text available for spelling check");
        assert_eq!(r.extra["text_extraction_error"], false);
    }

    #[test]
    fn disabled_is_an_info_pass() {
        let config = ScanConfig {
            enable_spelling: false,
            ..ScanConfig::default()
        };
        let r = SpellingCheck::new(&config).run(&with_text("zzz")).unwrap();
        assert!(r.passed);
        assert_eq!(r.extra["reason"], "disabled");
    }

    #[test]
    fn unreadable_allow_list_keeps_the_builtin_list() {
        let config = ScanConfig {
            spelling_dictionary: Some("/definitely/not/here.txt".into()),
            ..ScanConfig::default()
        };
        let r = SpellingCheck::new(&config).run(&with_text("hello world")).unwrap();
        assert!(r.passed);
        assert!(
            r.extra["allow_list_error"]
                .as_str()
                .is_some_and(|e| e.contains("here.txt"))
        );
    }

    #[test]
    fn allow_list_adds_project_words() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "# team words\nDocsweep\n\nxlsxwriter\n").unwrap();

        let list = WordList::load(&path).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.knows("docsweep"));

        let text = "Hello from Docsweep";
        assert!(!SpellingCheck::default().run(&with_text(text)).unwrap().passed);

        let config = ScanConfig {
            spelling_dictionary: Some(path),
            ..ScanConfig::default()
        };
        let r = SpellingCheck::new(&config).run(&with_text(text)).unwrap();
        assert!(r.passed);
        assert!(r.extra.get("allow_list_error").is_none());
    }
}
