// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan configuration.
//
// Precedence: CLI flags > DOCSWEEP_* environment variables > JSON config file
// > defaults. The serialised form is embedded in every report header.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DocsweepError, Result};
use crate::plugin::normalize_extension;

/// Settings shared by discovery, processors, and checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Longest acceptable file name (characters, extension included).
    pub max_filename_length: usize,
    /// Extensions picked up by discovery.
    pub target_extensions: Vec<String>,
    /// Directory names pruned during discovery (case-insensitive).
    pub ignore_dirs: Vec<String>,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_level: String,

    pub enable_spelling: bool,
    pub language_code: String,
    /// Extra words accepted by the spelling rule, one per line.
    pub spelling_dictionary: Option<PathBuf>,
    /// Cap on extracted text per file.
    pub max_text_chars: usize,
    /// More misspellings than this is an ERROR; fewer is a WARNING.
    pub spelling_fail_threshold: usize,
    pub max_misspellings_reported: usize,

    /// Latest acceptable modification time.
    pub modified_cutoff: Option<DateTime<Utc>>,

    /// Process files on the rayon pool.
    pub parallel: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_filename_length: 120,
            target_extensions: [".docx", ".pptx", ".pdf", ".xlsx"]
                .into_iter()
                .map(String::from)
                .collect(),
            ignore_dirs: [".git", "__pycache__", "venv"]
                .into_iter()
                .map(String::from)
                .collect(),
            log_level: "info".to_owned(),
            enable_spelling: true,
            language_code: "en".to_owned(),
            spelling_dictionary: None,
            max_text_chars: 5_000_000,
            spelling_fail_threshold: 10,
            max_misspellings_reported: 100,
            modified_cutoff: None,
            parallel: false,
        }
    }
}

impl ScanConfig {
    /// Load from a JSON file; missing keys take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&data)?;
        config.target_extensions = config
            .target_extensions
            .iter()
            .map(|e| normalize_extension(e))
            .filter(|e| !e.is_empty())
            .collect();
        Ok(config)
    }

    /// Apply `DOCSWEEP_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DOCSWEEP_MAX_FILENAME_LENGTH") {
            self.max_filename_length = parse_usize("DOCSWEEP_MAX_FILENAME_LENGTH", &v)?;
        }
        if let Some(v) = lookup("DOCSWEEP_MAX_TEXT_CHARS") {
            self.max_text_chars = parse_usize("DOCSWEEP_MAX_TEXT_CHARS", &v)?;
        }
        if let Some(v) = lookup("DOCSWEEP_SPELLING_FAIL_THRESHOLD") {
            self.spelling_fail_threshold = parse_usize("DOCSWEEP_SPELLING_FAIL_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("DOCSWEEP_MAX_MISSPELLINGS_REPORTED") {
            self.max_misspellings_reported =
                parse_usize("DOCSWEEP_MAX_MISSPELLINGS_REPORTED", &v)?;
        }
        if let Some(v) = lookup("DOCSWEEP_ENABLE_SPELLING") {
            self.enable_spelling = parse_bool(&v);
        }
        if let Some(v) = lookup("DOCSWEEP_PARALLEL") {
            self.parallel = parse_bool(&v);
        }
        if let Some(v) = lookup("DOCSWEEP_LOG_LEVEL") {
            self.log_level = v.trim().to_lowercase();
        }
        if let Some(v) = lookup("DOCSWEEP_LANGUAGE_CODE") {
            self.language_code = v.trim().to_owned();
        }
        if let Some(v) = lookup("DOCSWEEP_SPELLING_DICTIONARY") {
            self.spelling_dictionary = Some(PathBuf::from(v.trim()));
        }
        if let Some(v) = lookup("DOCSWEEP_MODIFIED_CUTOFF") {
            self.modified_cutoff = Some(parse_cutoff(&v)?);
        }
        if let Some(v) = lookup("DOCSWEEP_IGNORE_DIRS") {
            self.ignore_dirs = split_list(&v);
        }
        if let Some(v) = lookup("DOCSWEEP_TARGET_EXTS") {
            self.target_extensions = split_list(&v)
                .iter()
                .map(|e| normalize_extension(e))
                .collect();
        }
        Ok(())
    }

    /// JSON snapshot embedded in the report header.
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Parse a modification cutoff.
///
/// Accepts RFC 3339 (`2025-01-31T18:30:00+05:30`), a naive date-time taken as
/// UTC (`2025-01-31T18:30:00`), or a bare date meaning the end of that day in
/// UTC (`2025-01-31`).
pub fn parse_cutoff(value: &str) -> Result<DateTime<Utc>> {
    let s = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Some(end_of_day) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_micro_opt(23, 59, 59, 999_999))
    {
        return Ok(end_of_day.and_utc());
    }
    Err(DocsweepError::Config(format!(
        "could not parse cutoff '{s}'; use formats like '2025-01-31' or '2025-01-31T18:30:00+05:30'"
    )))
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_usize(key: &str, s: &str) -> Result<usize> {
    s.trim()
        .parse()
        .map_err(|_| DocsweepError::Config(format!("{key} must be a non-negative integer, got '{s}'")))
}
