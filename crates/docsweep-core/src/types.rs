// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Docsweep scan pipeline.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::facts::Facts;
use crate::plugin::normalize_extension;

/// Schema tag carried in every report header.
pub const SCHEMA_VERSION: &str = "1.0-file-centric";

/// How serious a finding is.
///
/// Ordered by attention: `Error > Warning > Info`. The ordering is used for
/// sorting and filtering only; verdicts are derived from counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only description of one file, produced once by a processor and
/// shared by reference with every check that runs against it.
#[derive(Debug, Clone, Serialize)]
pub struct FileArtifact {
    path: PathBuf,
    extension: String,
    size_bytes: u64,
    facts: Facts,
}

impl FileArtifact {
    pub fn new(path: impl Into<PathBuf>, extension: &str, size_bytes: u64, facts: Facts) -> Self {
        Self {
            path: path.into(),
            extension: normalize_extension(extension),
            size_bytes,
            facts,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lowercase, dot-prefixed extension (e.g. `.xlsx`).
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn facts(&self) -> &Facts {
        &self.facts
    }
}

/// Outcome of running a single check against a single artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub file: PathBuf,
    pub check_name: String,
    pub severity: Severity,
    pub passed: bool,
    pub message: String,
    pub extra: Map<String, Value>,
}

impl CheckResult {
    pub fn new(
        file: impl Into<PathBuf>,
        check_name: impl Into<String>,
        severity: Severity,
        passed: bool,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            check_name: check_name.into(),
            severity,
            passed,
            message: message.into(),
            extra: Map::new(),
        }
    }

    /// A passing INFO result for `artifact`.
    pub fn pass(artifact: &FileArtifact, check_name: &str, message: impl Into<String>) -> Self {
        Self::new(artifact.path(), check_name, Severity::Info, true, message)
    }

    /// A failing result for `artifact` at the given severity.
    pub fn fail(
        artifact: &FileArtifact,
        check_name: &str,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self::new(artifact.path(), check_name, severity, false, message)
    }

    /// Attach one structured detail.
    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_owned(), value.into());
        self
    }
}

/// Worst-severity classification of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileVerdict {
    Pass,
    Warn,
    Fail,
}

impl FileVerdict {
    /// FAIL iff any failed ERROR; else WARN iff any failed WARNING; else PASS.
    pub fn from_counts(errors: usize, warnings: usize) -> Self {
        if errors > 0 {
            Self::Fail
        } else if warnings > 0 {
            Self::Warn
        } else {
            Self::Pass
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        }
    }
}

impl std::fmt::Display for FileVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All results for one file plus the derived verdict and counts.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    file: PathBuf,
    extension: String,
    size_bytes: u64,
    verdict: FileVerdict,
    errors: usize,
    warnings: usize,
    infos: usize,
    results: Vec<CheckResult>,
}

impl FileReport {
    /// Build the report for one file. Errors and warnings count failed
    /// results only; infos count every INFO result regardless of outcome.
    pub fn from_results(
        file: PathBuf,
        extension: String,
        size_bytes: u64,
        results: Vec<CheckResult>,
    ) -> Self {
        let failed = |severity: Severity| {
            results
                .iter()
                .filter(|r| r.severity == severity && !r.passed)
                .count()
        };
        let errors = failed(Severity::Error);
        let warnings = failed(Severity::Warning);
        let infos = results
            .iter()
            .filter(|r| r.severity == Severity::Info)
            .count();

        Self {
            file,
            extension,
            size_bytes,
            verdict: FileVerdict::from_counts(errors, warnings),
            errors,
            warnings,
            infos,
            results,
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn verdict(&self) -> FileVerdict {
        self.verdict
    }

    /// Failed ERROR results.
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Failed WARNING results.
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// INFO results, passed or not.
    pub fn infos(&self) -> usize {
        self.infos
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }
}

/// Run-level totals, always summed from the file reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub files: usize,
    pub checks: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl RunTotals {
    pub fn from_files(files: &[FileReport]) -> Self {
        files.iter().fold(
            Self {
                files: files.len(),
                ..Self::default()
            },
            |acc, f| Self {
                checks: acc.checks + f.results.len(),
                errors: acc.errors + f.errors,
                warnings: acc.warnings + f.warnings,
                infos: acc.infos + f.infos,
                ..acc
            },
        )
    }
}

/// Metadata about one scan run.
#[derive(Debug, Clone, Serialize)]
pub struct RunHeader {
    pub schema_version: String,
    pub run_id: Uuid,
    pub root: PathBuf,
    pub started_at_utc: DateTime<Utc>,
    pub finished_at_utc: DateTime<Utc>,
    pub config_snapshot: Value,
    totals: RunTotals,
}

impl RunHeader {
    pub fn totals(&self) -> RunTotals {
        self.totals
    }
}

/// Top-level artifact of a run: header plus file reports sorted by path.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    header: RunHeader,
    files: Vec<FileReport>,
}

impl ScanReport {
    /// Assemble the final report. Files are sorted by case-insensitive path
    /// and the header totals are summed from them.
    pub fn assemble(
        root: PathBuf,
        started_at_utc: DateTime<Utc>,
        finished_at_utc: DateTime<Utc>,
        config_snapshot: Value,
        mut files: Vec<FileReport>,
    ) -> Self {
        files.sort_by_cached_key(|f| f.file.to_string_lossy().to_lowercase());
        let header = RunHeader {
            schema_version: SCHEMA_VERSION.to_owned(),
            run_id: Uuid::new_v4(),
            root,
            started_at_utc,
            finished_at_utc,
            config_snapshot,
            totals: RunTotals::from_files(&files),
        };
        Self { header, files }
    }

    pub fn header(&self) -> &RunHeader {
        &self.header
    }

    /// File reports in case-insensitive path order.
    pub fn files(&self) -> &[FileReport] {
        &self.files
    }

    /// Whether any file ended with a FAIL verdict.
    pub fn has_failures(&self) -> bool {
        self.files.iter().any(|f| f.verdict == FileVerdict::Fail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(severity: Severity, passed: bool) -> CheckResult {
        CheckResult::new("/tmp/a.docx", "rule", severity, passed, "msg")
    }

    fn report(results: Vec<CheckResult>) -> FileReport {
        FileReport::from_results("/tmp/a.docx".into(), ".docx".into(), 10, results)
    }

    #[test]
    fn severity_orders_by_attention() {
        assert!(Severity::Error > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
    }

    #[test]
    fn empty_file_report_is_pass_with_zero_counts() {
        let r = report(Vec::new());
        assert_eq!(r.verdict(), FileVerdict::Pass);
        assert_eq!((r.errors(), r.warnings(), r.infos()), (0, 0, 0));
    }

    #[test]
    fn failed_error_makes_fail() {
        let r = report(vec![
            result(Severity::Error, false),
            result(Severity::Warning, false),
        ]);
        assert_eq!(r.verdict(), FileVerdict::Fail);
        assert_eq!((r.errors(), r.warnings()), (1, 1));
    }

    #[test]
    fn passed_error_is_not_counted() {
        let r = report(vec![
            result(Severity::Error, true),
            result(Severity::Warning, false),
        ]);
        assert_eq!(r.errors(), 0);
        assert_eq!(r.verdict(), FileVerdict::Warn);
    }

    #[test]
    fn infos_count_regardless_of_outcome() {
        let r = report(vec![result(Severity::Info, true), result(Severity::Info, false)]);
        assert_eq!(r.infos(), 2);
        assert_eq!(r.verdict(), FileVerdict::Pass);
    }

    #[test]
    fn assemble_sorts_case_insensitively_and_sums_totals() {
        let b = FileReport::from_results(
            "/root/b.pdf".into(),
            ".pdf".into(),
            1,
            vec![CheckResult::new("/root/b.pdf", "x", Severity::Error, false, "")],
        );
        let a = FileReport::from_results(
            "/root/A.pdf".into(),
            ".pdf".into(),
            1,
            vec![
                CheckResult::new("/root/A.pdf", "x", Severity::Warning, false, ""),
                CheckResult::new("/root/A.pdf", "y", Severity::Info, true, ""),
            ],
        );
        let now = Utc::now();
        let report = ScanReport::assemble("/root".into(), now, now, Value::Null, vec![b, a]);

        assert_eq!(report.files()[0].file(), Path::new("/root/A.pdf"));
        let totals = report.header().totals();
        assert_eq!(totals.files, 2);
        assert_eq!(totals.checks, 3);
        assert_eq!(totals.errors + totals.warnings + totals.infos, 3);
        assert_eq!(report.header().schema_version, SCHEMA_VERSION);
        assert!(report.has_failures());
    }

    #[test]
    fn file_report_serializes_its_derived_fields() {
        let r = report(vec![result(Severity::Warning, false)]);
        assert_eq!(r.file(), Path::new("/tmp/a.docx"));
        assert_eq!((r.extension(), r.size_bytes()), (".docx", 10));
        assert_eq!(r.results().len(), 1);

        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["verdict"], "WARN");
        assert_eq!(json["warnings"], 1);
        assert_eq!(json["results"][0]["check_name"], "rule");
    }

    #[test]
    fn with_extra_records_details() {
        let r = result(Severity::Info, true).with_extra("count", 3);
        assert_eq!(r.extra["count"], 3);
    }
}
