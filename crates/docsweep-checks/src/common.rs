// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rules shared across file families: file name length and the modification
// cutoff.

use std::path::Path;

use chrono::{DateTime, Utc};
use docsweep_core::error::Result;
use docsweep_core::{Check, CheckResult, Facts, FileArtifact, ScanConfig, Severity, WILDCARD};
use tracing::debug;

/// Warns when a file name (extension included) is longer than the limit.
pub struct FilenameLengthCheck {
    max_len: usize,
}

impl FilenameLengthCheck {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_limit(config.max_filename_length)
    }

    pub fn with_limit(max_len: usize) -> Self {
        Self { max_len }
    }
}

impl Default for FilenameLengthCheck {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl Check for FilenameLengthCheck {
    fn name(&self) -> &str {
        "Filename length"
    }

    fn applies_to(&self) -> Vec<String> {
        vec![WILDCARD.to_owned()]
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        let length = artifact
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().chars().count())
            .unwrap_or(0);

        let result = if length <= self.max_len {
            CheckResult::pass(artifact, self.name(), "OK: file name length within limit")
        } else {
            CheckResult::fail(
                artifact,
                self.name(),
                Severity::Warning,
                format!("File name is {length} characters (limit {})", self.max_len),
            )
        };
        Ok(result
            .with_extra("filename_length", length)
            .with_extra("max_filename_length", self.max_len))
    }
}

/// Every file must have been modified on or before the configured cutoff.
///
/// Document timestamps (`docProps/core.xml`, PDF `/ModDate`) win over the
/// filesystem modification time, which is only a fallback.
pub struct ModifiedBeforeCutoffCheck {
    cutoff: Option<DateTime<Utc>>,
}

impl ModifiedBeforeCutoffCheck {
    pub fn new(config: &ScanConfig) -> Self {
        Self::with_cutoff(config.modified_cutoff)
    }

    pub fn with_cutoff(cutoff: Option<DateTime<Utc>>) -> Self {
        Self { cutoff }
    }
}

impl Default for ModifiedBeforeCutoffCheck {
    fn default() -> Self {
        Self::with_cutoff(None)
    }
}

impl Check for ModifiedBeforeCutoffCheck {
    fn name(&self) -> &str {
        "Modified on or before cutoff"
    }

    fn applies_to(&self) -> Vec<String> {
        [".docx", ".pptx", ".pdf"].map(String::from).to_vec()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        let Some(cutoff) = self.cutoff else {
            return Ok(CheckResult::pass(artifact, self.name(), "No cutoff configured")
                .with_extra("reason", "no_cutoff"));
        };

        let Some((observed, source)) = observed_modification(artifact) else {
            return Ok(CheckResult::fail(
                artifact,
                self.name(),
                Severity::Warning,
                "Unable to determine last modified time",
            )
            .with_extra("source", serde_json::Value::Null)
            .with_extra("cutoff_utc", cutoff.to_rfc3339()));
        };
        debug!(source, observed = %observed, "modification time chosen");

        let result = if observed <= cutoff {
            CheckResult::pass(artifact, self.name(), "OK: modified <= cutoff")
        } else {
            CheckResult::fail(artifact, self.name(), Severity::Error, "Modified after cutoff")
        };
        Ok(result
            .with_extra("observed_source", source)
            .with_extra("observed_utc", observed.to_rfc3339())
            .with_extra("cutoff_utc", cutoff.to_rfc3339()))
    }
}

/// Best available modification time and where it came from.
fn observed_modification(artifact: &FileArtifact) -> Option<(DateTime<Utc>, &'static str)> {
    if let Some(modified) = artifact.facts().modified() {
        let source = match artifact.facts() {
            Facts::Pdf(_) => "pdf_mod_date",
            _ => "doc_property",
        };
        return Some((modified, source));
    }
    filesystem_mtime(artifact.path()).map(|mtime| (mtime, "fs_mtime"))
}

fn filesystem_mtime(path: &Path) -> Option<DateTime<Utc>> {
    let modified = std::fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Utc>::from(modified))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use chrono::TimeZone;
    use docsweep_core::{CoreProperties, DocxFacts, PdfFacts};
    use std::collections::BTreeMap;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn docx_modified(when: DateTime<Utc>) -> FileArtifact {
        testing::docx(DocxFacts {
            core: CoreProperties {
                modified: Some(when),
                ..CoreProperties::default()
            },
            ..DocxFacts::default()
        })
    }

    #[test]
    fn long_file_names_warn() {
        let name = format!("/scan/{}.pdf", "a".repeat(20));
        let artifact = FileArtifact::new(name, ".pdf", 1, Facts::Other(BTreeMap::new()));

        let r = FilenameLengthCheck::with_limit(24).run(&artifact).unwrap();
        assert!(r.passed);
        assert_eq!(r.extra["filename_length"], 24);

        let r = FilenameLengthCheck::with_limit(23).run(&artifact).unwrap();
        assert!(!r.passed);
        assert_eq!(r.severity, Severity::Warning);
    }

    #[test]
    fn filename_length_targets_everything() {
        assert!(FilenameLengthCheck::default().targets(".csv"));
    }

    #[test]
    fn no_cutoff_is_an_info_pass() {
        let r = ModifiedBeforeCutoffCheck::default()
            .run(&docx_modified(at(2030, 1, 1)))
            .unwrap();
        assert!(r.passed);
        assert_eq!(r.severity, Severity::Info);
        assert_eq!(r.message, "No cutoff configured");
    }

    #[test]
    fn document_property_after_cutoff_is_an_error() {
        let check = ModifiedBeforeCutoffCheck::with_cutoff(Some(at(2024, 6, 1)));

        let r = check.run(&docx_modified(at(2024, 6, 2))).unwrap();
        assert!(!r.passed);
        assert_eq!(r.severity, Severity::Error);
        assert_eq!(r.extra["observed_source"], "doc_property");

        let r = check.run(&docx_modified(at(2024, 6, 1))).unwrap();
        assert!(r.passed);
    }

    #[test]
    fn pdf_mod_date_is_labelled() {
        let artifact = testing::pdf(PdfFacts {
            mod_date: Some(at(2020, 1, 1)),
            ..PdfFacts::default()
        });
        let r = ModifiedBeforeCutoffCheck::with_cutoff(Some(at(2024, 1, 1)))
            .run(&artifact)
            .unwrap();
        assert!(r.passed);
        assert_eq!(r.extra["observed_source"], "pdf_mod_date");
        assert_eq!(r.extra["observed_utc"], "2020-01-01T12:00:00+00:00");
    }

    #[test]
    fn falls_back_to_filesystem_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.docx");
        std::fs::write(&path, b"not really a docx").unwrap();
        let artifact = FileArtifact::new(&path, ".docx", 17, Facts::Docx(DocxFacts::default()));

        let r = ModifiedBeforeCutoffCheck::with_cutoff(Some(at(2000, 1, 1)))
            .run(&artifact)
            .unwrap();
        assert_eq!(r.severity, Severity::Error);
        assert_eq!(r.extra["observed_source"], "fs_mtime");
    }

    #[test]
    fn undeterminable_time_warns() {
        let artifact = testing::docx(DocxFacts::default());
        let r = ModifiedBeforeCutoffCheck::with_cutoff(Some(at(2024, 1, 1)))
            .run(&artifact)
            .unwrap();
        assert_eq!(r.severity, Severity::Warning);
        assert!(!r.passed);
        assert!(r.extra["source"].is_null());
    }
}
