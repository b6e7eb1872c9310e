// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsweep-checks — The compliance rule catalogue.
//
// Every rule reads only the typed facts of the artifact it is given. An
// artifact of the wrong family or one whose structural read failed yields a
// WARNING result rather than an error.

pub mod common;
pub mod docx;
pub mod pdf;
pub mod pptx;
pub mod spelling;
pub mod xlsx;

pub use common::{FilenameLengthCheck, ModifiedBeforeCutoffCheck};
pub use docx::{DocxNoCommentsCheck, DocxNoHighlightsCheck, DocxNoTrackedChangesCheck};
pub use pdf::{PdfNoCommentsCheck, PdfNoHighlightsCheck};
pub use pptx::PptxNoCommentsCheck;
pub use spelling::{SpellingCheck, WordList};
pub use xlsx::{
    XlsxCommentsCheck, XlsxDataConnectionsCheck, XlsxExternalLinksCheck, XlsxFormulaErrorsCheck,
    XlsxHiddenSheetsCheck, XlsxVbaInXlsxCheck, XlsxWorkbookProtectionCheck, XlsxYellowCellsCheck,
    XlsxYellowSheetTabsCheck,
};

use docsweep_core::{CheckResult, Facts, FileArtifact, Severity};

/// Evaluate `rule` against the facts selected by `select`.
///
/// Facts of another family, or facts carrying a `read_error`, short-circuit
/// into a WARNING attributed to `check`.
pub(crate) fn evaluate<'a, T: 'a>(
    artifact: &'a FileArtifact,
    check: &str,
    label: &str,
    select: fn(&'a Facts) -> Option<&'a T>,
    rule: impl FnOnce(&'a T) -> CheckResult,
) -> CheckResult {
    let Some(facts) = select(artifact.facts()) else {
        return unexpected_facts(artifact, check, label);
    };
    if let Some(result) = unreadable(artifact, check, label) {
        return result;
    }
    rule(facts)
}

pub(crate) fn unexpected_facts(artifact: &FileArtifact, check: &str, label: &str) -> CheckResult {
    tracing::warn!(
        check,
        kind = artifact.facts().kind(),
        "artifact facts do not match the rule's family"
    );
    CheckResult::fail(
        artifact,
        check,
        Severity::Warning,
        format!("Cannot evaluate: expected {label} facts"),
    )
    .with_extra("facts_kind", artifact.facts().kind())
}

pub(crate) fn unreadable(artifact: &FileArtifact, check: &str, label: &str) -> Option<CheckResult> {
    let detail = artifact.facts().read_error()?;
    Some(
        CheckResult::fail(
            artifact,
            check,
            Severity::Warning,
            format!("Unreadable {label} (parse error)"),
        )
        .with_extra("read_error", true)
        .with_extra("read_error_detail", detail),
    )
}

/// INFO pass when `count` is zero, ERROR otherwise.
pub(crate) fn none_allowed(
    artifact: &FileArtifact,
    check: &str,
    count: usize,
    ok: &str,
    found: impl FnOnce() -> String,
) -> CheckResult {
    if count == 0 {
        CheckResult::pass(artifact, check, ok)
    } else {
        CheckResult::fail(artifact, check, Severity::Error, found())
    }
}
