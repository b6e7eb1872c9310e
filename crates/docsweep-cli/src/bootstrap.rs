// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Registry composition. Every processor and rule the binary ships with is
// registered here, explicitly and in a fixed order.

use docsweep_checks::{
    DocxNoCommentsCheck, DocxNoHighlightsCheck, DocxNoTrackedChangesCheck, FilenameLengthCheck,
    ModifiedBeforeCutoffCheck, PdfNoCommentsCheck, PdfNoHighlightsCheck, PptxNoCommentsCheck,
    SpellingCheck, XlsxCommentsCheck, XlsxDataConnectionsCheck, XlsxExternalLinksCheck,
    XlsxFormulaErrorsCheck, XlsxHiddenSheetsCheck, XlsxVbaInXlsxCheck,
    XlsxWorkbookProtectionCheck, XlsxYellowCellsCheck, XlsxYellowSheetTabsCheck,
};
use docsweep_core::{Registry, ScanConfig};
use docsweep_document::{DocxProcessor, PdfProcessor, PptxProcessor, XlsxProcessor};
use tracing::debug;

pub fn build_registry(config: &ScanConfig) -> Registry {
    let mut registry = Registry::new();

    registry
        .register_processor(XlsxProcessor::new(config))
        .register_processor(DocxProcessor::new(config))
        .register_processor(PptxProcessor::new(config))
        .register_processor(PdfProcessor::new(config));

    // Any format
    registry
        .register_check(FilenameLengthCheck::new(config))
        .register_check(ModifiedBeforeCutoffCheck::new(config))
        .register_check(SpellingCheck::new(config));

    // Spreadsheets
    registry
        .register_check(XlsxHiddenSheetsCheck)
        .register_check(XlsxFormulaErrorsCheck)
        .register_check(XlsxExternalLinksCheck)
        .register_check(XlsxDataConnectionsCheck)
        .register_check(XlsxWorkbookProtectionCheck)
        .register_check(XlsxCommentsCheck)
        .register_check(XlsxVbaInXlsxCheck)
        .register_check(XlsxYellowCellsCheck)
        .register_check(XlsxYellowSheetTabsCheck);

    // Word processing and slides
    registry
        .register_check(DocxNoCommentsCheck)
        .register_check(DocxNoTrackedChangesCheck)
        .register_check(DocxNoHighlightsCheck)
        .register_check(PptxNoCommentsCheck);

    // PDF
    registry
        .register_check(PdfNoCommentsCheck)
        .register_check(PdfNoHighlightsCheck);

    debug!(
        processors = registry.processor_count(),
        checks = registry.check_count(),
        "registry composed"
    );
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsweep_core::{FileVerdict, Severity};
    use docsweep_scan::{DiscoveryOptions, NO_PROCESSOR, Orchestrator};
    use std::collections::HashSet;

    #[test]
    fn registers_every_processor_and_rule() {
        let registry = build_registry(&ScanConfig::default());
        assert_eq!(registry.processor_count(), 4);
        assert_eq!(registry.check_count(), 18);

        let names: HashSet<String> = registry
            .checks()
            .iter()
            .map(|c| c.name().to_owned())
            .collect();
        assert_eq!(names.len(), 18, "rule names must be unique");
        assert!(names.contains("xlsx_yellow_cells"));
        assert!(names.contains("spelling"));
    }

    #[test]
    fn each_document_extension_has_exactly_one_processor() {
        let registry = build_registry(&ScanConfig::default());
        let orchestrator = Orchestrator::new(&registry);
        let index = orchestrator.processor_index();

        assert!(index.conflicts().is_empty());
        assert_eq!(index.extensions(), vec![".docx", ".pdf", ".pptx", ".xlsx"]);
    }

    #[test]
    fn every_rule_targets_a_configured_extension() {
        let config = ScanConfig::default();
        let registry = build_registry(&config);
        for check in registry.checks() {
            assert!(
                config.target_extensions.iter().any(|ext| check.targets(ext)),
                "{} never runs",
                check.name()
            );
        }
    }

    #[test]
    fn text_file_without_a_processor_gets_only_the_unmatched_warning() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "plain text").unwrap();

        let config = ScanConfig::default();
        let registry = build_registry(&config);
        let mut extensions = config.target_extensions.clone();
        extensions.push(".txt".to_owned());
        let report = Orchestrator::new(&registry)
            .with_discovery(DiscoveryOptions::new(&extensions, &config.ignore_dirs))
            .run_scan(dir.path(), config.snapshot())
            .unwrap();

        let [file] = report.files() else {
            panic!("expected one file, got {}", report.files().len());
        };
        // Wildcard rules such as the filename length rule need an artifact.
        let [result] = file.results() else {
            panic!("expected one result, got {:?}", file.results());
        };
        assert_eq!(result.check_name, NO_PROCESSOR);
        assert_eq!(result.severity, Severity::Warning);
        assert_eq!(result.extra["extension"], ".txt");
        assert_eq!(file.verdict(), FileVerdict::Warn);
    }
}
