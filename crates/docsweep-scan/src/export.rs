// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Report exporters: the JSON document (header, totals, files with embedded
// results) and two CSV tables, one row per file and one row per result.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use docsweep_core::error::{DocsweepError, Result};
use docsweep_core::{CheckResult, FileReport, RunTotals, ScanReport};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

/// Writes a `ScanReport` somewhere.
pub trait ReportWriter {
    fn write(&self, report: &ScanReport) -> Result<()>;
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

pub struct JsonReportWriter {
    path: PathBuf,
}

impl JsonReportWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Serialise `report` as pretty JSON into `out`.
    pub fn write_to<W: Write>(report: &ScanReport, out: W) -> Result<()> {
        serde_json::to_writer_pretty(out, &JsonDocument::from(report))?;
        Ok(())
    }
}

impl ReportWriter for JsonReportWriter {
    fn write(&self, report: &ScanReport) -> Result<()> {
        let mut out = BufWriter::new(File::create(&self.path)?);
        Self::write_to(report, &mut out)?;
        out.flush()?;
        info!(path = %self.path.display(), "JSON report written");
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    schema_version: &'a str,
    header: JsonHeader<'a>,
    files: Vec<JsonFile<'a>>,
}

#[derive(Serialize)]
struct JsonHeader<'a> {
    run_id: Uuid,
    root: &'a Path,
    started_at_utc: DateTime<Utc>,
    finished_at_utc: DateTime<Utc>,
    config_snapshot: &'a Value,
    totals: RunTotals,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    file: &'a Path,
    extension: &'a str,
    size_bytes: u64,
    verdict: &'a str,
    counts: JsonCounts,
    results: Vec<JsonResult<'a>>,
}

#[derive(Serialize)]
struct JsonCounts {
    errors: usize,
    warnings: usize,
    infos: usize,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    file: &'a Path,
    check: &'a str,
    severity: &'a str,
    passed: bool,
    message: &'a str,
    extra: &'a Map<String, Value>,
}

impl<'a> From<&'a ScanReport> for JsonDocument<'a> {
    fn from(report: &'a ScanReport) -> Self {
        let header = report.header();
        Self {
            schema_version: &header.schema_version,
            header: JsonHeader {
                run_id: header.run_id,
                root: &header.root,
                started_at_utc: header.started_at_utc,
                finished_at_utc: header.finished_at_utc,
                config_snapshot: &header.config_snapshot,
                totals: header.totals(),
            },
            files: report.files().iter().map(JsonFile::from).collect(),
        }
    }
}

impl<'a> From<&'a FileReport> for JsonFile<'a> {
    fn from(file: &'a FileReport) -> Self {
        Self {
            file: file.file(),
            extension: file.extension(),
            size_bytes: file.size_bytes(),
            verdict: file.verdict().as_str(),
            counts: JsonCounts {
                errors: file.errors(),
                warnings: file.warnings(),
                infos: file.infos(),
            },
            results: file.results().iter().map(JsonResult::from).collect(),
        }
    }
}

impl<'a> From<&'a CheckResult> for JsonResult<'a> {
    fn from(result: &'a CheckResult) -> Self {
        Self {
            file: &result.file,
            check: &result.check_name,
            severity: result.severity.as_str(),
            passed: result.passed,
            message: &result.message,
            extra: &result.extra,
        }
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

fn csv_error(err: impl std::fmt::Display) -> DocsweepError {
    DocsweepError::Csv(err.to_string())
}

/// One row per file: `File,Extension,SizeBytes,Verdict,Errors,Warnings,Infos`.
pub struct FilesCsvWriter {
    path: PathBuf,
}

impl FilesCsvWriter {
    pub const HEADER: [&'static str; 7] = [
        "File",
        "Extension",
        "SizeBytes",
        "Verdict",
        "Errors",
        "Warnings",
        "Infos",
    ];

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn write_to<W: Write>(report: &ScanReport, out: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(out);
        csv.write_record(Self::HEADER).map_err(csv_error)?;
        for file in report.files() {
            csv.write_record([
                file.file().to_string_lossy().into_owned(),
                file.extension().to_owned(),
                file.size_bytes().to_string(),
                file.verdict().as_str().to_owned(),
                file.errors().to_string(),
                file.warnings().to_string(),
                file.infos().to_string(),
            ])
            .map_err(csv_error)?;
        }
        csv.flush()?;
        Ok(())
    }
}

impl ReportWriter for FilesCsvWriter {
    fn write(&self, report: &ScanReport) -> Result<()> {
        Self::write_to(report, File::create(&self.path)?)?;
        info!(path = %self.path.display(), rows = report.files().len(), "files CSV written");
        Ok(())
    }
}

/// One row per result: `File,Check,Severity,Passed,Message,Extra` with the
/// details as a JSON object.
pub struct ChecksCsvWriter {
    path: PathBuf,
}

impl ChecksCsvWriter {
    pub const HEADER: [&'static str; 6] = ["File", "Check", "Severity", "Passed", "Message", "Extra"];

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn write_to<W: Write>(report: &ScanReport, out: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(out);
        csv.write_record(Self::HEADER).map_err(csv_error)?;
        for result in report.files().iter().flat_map(|f| f.results()) {
            csv.write_record([
                result.file.to_string_lossy().into_owned(),
                result.check_name.clone(),
                result.severity.as_str().to_owned(),
                if result.passed { "TRUE" } else { "FALSE" }.to_owned(),
                result.message.clone(),
                serde_json::to_string(&result.extra)?,
            ])
            .map_err(csv_error)?;
        }
        csv.flush()?;
        Ok(())
    }
}

impl ReportWriter for ChecksCsvWriter {
    fn write(&self, report: &ScanReport) -> Result<()> {
        Self::write_to(report, File::create(&self.path)?)?;
        info!(path = %self.path.display(), rows = report.header().totals().checks, "checks CSV written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsweep_core::Severity;

    fn report() -> ScanReport {
        let failed = CheckResult::new(
            "/scan/a.docx",
            "DOCX: no comments",
            Severity::Error,
            false,
            "Found 2 comment(s), see \"Review\"",
        )
        .with_extra("comments_count", 2);
        let passed = CheckResult::new("/scan/a.docx", "Filename length", Severity::Info, true, "ok");
        let file = FileReport::from_results(
            "/scan/a.docx".into(),
            ".docx".into(),
            42,
            vec![failed, passed],
        );
        let now = Utc::now();
        ScanReport::assemble("/scan".into(), now, now, serde_json::json!({"k": 1}), vec![file])
    }

    #[test]
    fn json_document_nests_counts_and_results() {
        let mut buf = Vec::new();
        JsonReportWriter::write_to(&report(), &mut buf).unwrap();
        let doc: Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(doc["schema_version"], "1.0-file-centric");
        assert_eq!(doc["header"]["totals"]["checks"], 2);
        assert_eq!(doc["header"]["totals"]["errors"], 1);
        assert_eq!(doc["header"]["config_snapshot"]["k"], 1);
        assert_eq!(doc["files"][0]["verdict"], "FAIL");
        assert_eq!(doc["files"][0]["counts"]["infos"], 1);
        assert_eq!(doc["files"][0]["results"][0]["check"], "DOCX: no comments");
        assert_eq!(doc["files"][0]["results"][0]["extra"]["comments_count"], 2);
    }

    #[test]
    fn files_csv_has_one_row_per_file() {
        let mut buf = Vec::new();
        FilesCsvWriter::write_to(&report(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "File,Extension,SizeBytes,Verdict,Errors,Warnings,Infos");
        assert_eq!(lines[1], "/scan/a.docx,.docx,42,FAIL,1,0,1");
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn checks_csv_quotes_messages_and_embeds_extra_json() {
        let mut buf = Vec::new();
        ChecksCsvWriter::write_to(&report(), &mut buf).unwrap();

        let mut reader = csv::Reader::from_reader(buf.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][3], "FALSE");
        assert_eq!(&rows[0][4], "Found 2 comment(s), see \"Review\"");
        let extra: Value = serde_json::from_str(&rows[0][5]).unwrap();
        assert_eq!(extra["comments_count"], 2);
        assert_eq!(&rows[1][3], "TRUE");
    }

    #[test]
    fn writers_create_files() {
        let dir = tempfile::tempdir().unwrap();
        let report = report();
        let writers: Vec<(Box<dyn ReportWriter>, PathBuf)> = vec![
            (Box::new(JsonReportWriter::new(dir.path().join("r.json"))), dir.path().join("r.json")),
            (Box::new(FilesCsvWriter::new(dir.path().join("f.csv"))), dir.path().join("f.csv")),
            (Box::new(ChecksCsvWriter::new(dir.path().join("c.csv"))), dir.path().join("c.csv")),
        ];
        for (writer, path) in writers {
            writer.write(&report).unwrap();
            assert!(std::fs::metadata(&path).unwrap().len() > 0);
        }
    }
}
