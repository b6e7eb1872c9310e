// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Workbook rules: hidden sheets, formula errors, external links, data
// connections, protection, comments, macros and classic-yellow highlighting.

use docsweep_core::error::Result;
use docsweep_core::{Check, CheckResult, Facts, FileArtifact, Severity};
use serde_json::Value;

use crate::{evaluate, none_allowed, unexpected_facts, unreadable};

const LABEL: &str = "XLSX";

/// Upper bound on cell references copied into a result's details.
const MAX_LISTED_CELLS: usize = 200;

fn xlsx_only() -> Vec<String> {
    vec![".xlsx".to_owned()]
}

/// Fails when any sheet is hidden or very hidden.
pub struct XlsxHiddenSheetsCheck;

impl Check for XlsxHiddenSheetsCheck {
    fn name(&self) -> &str {
        "xlsx_hidden_sheets"
    }

    fn applies_to(&self) -> Vec<String> {
        xlsx_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        Ok(evaluate(artifact, self.name(), LABEL, Facts::as_xlsx, |f| {
            let (hidden, very_hidden) = (f.hidden_sheet_count, f.very_hidden_sheet_count);
            none_allowed(
                artifact,
                self.name(),
                hidden + very_hidden,
                "OK: no hidden/very hidden sheets",
                || format!("Found {hidden} hidden and {very_hidden} very hidden sheet(s)"),
            )
            .with_extra("hidden_sheet_count", hidden)
            .with_extra("very_hidden_sheet_count", very_hidden)
        }))
    }
}

/// Formulas are allowed; error cells and error tokens are not.
pub struct XlsxFormulaErrorsCheck;

impl Check for XlsxFormulaErrorsCheck {
    fn name(&self) -> &str {
        "xlsx_formula_errors"
    }

    fn applies_to(&self) -> Vec<String> {
        xlsx_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        Ok(evaluate(artifact, self.name(), LABEL, Facts::as_xlsx, |f| {
            let cells = f.error_cell_count;
            let refs = f.formula_ref_error_count;
            let others = f.other_error_token_count;
            none_allowed(
                artifact,
                self.name(),
                cells + refs + others,
                "OK: no formula errors",
                || format!("Formula issues: error_cells={cells}, #REF!={refs}, other_errors={others}"),
            )
            .with_extra("formula_count", f.formula_count)
            .with_extra("error_cell_count", cells)
            .with_extra("formula_ref_error_count", refs)
            .with_extra("other_error_token_count", others)
        }))
    }
}

pub struct XlsxExternalLinksCheck;

impl Check for XlsxExternalLinksCheck {
    fn name(&self) -> &str {
        "xlsx_external_links"
    }

    fn applies_to(&self) -> Vec<String> {
        xlsx_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        Ok(evaluate(artifact, self.name(), LABEL, Facts::as_xlsx, |f| {
            let count = f.external_links_count;
            none_allowed(artifact, self.name(), count, "OK: no external links", || {
                format!("Found {count} external link(s)")
            })
            .with_extra("external_links_count", count)
        }))
    }
}

pub struct XlsxDataConnectionsCheck;

impl Check for XlsxDataConnectionsCheck {
    fn name(&self) -> &str {
        "xlsx_data_connections"
    }

    fn applies_to(&self) -> Vec<String> {
        xlsx_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        Ok(evaluate(artifact, self.name(), LABEL, Facts::as_xlsx, |f| {
            let count = f.data_connections_count;
            none_allowed(artifact, self.name(), count, "OK: no data connections", || {
                format!("Found {count} data connection(s)")
            })
            .with_extra("data_connections_count", count)
        }))
    }
}

/// ERROR for a password-encrypted workbook, WARNING for structure
/// protection.
///
/// Encryption is reported even when the rest of the workbook could not be
/// read, since an encrypted file is never readable.
pub struct XlsxWorkbookProtectionCheck;

impl Check for XlsxWorkbookProtectionCheck {
    fn name(&self) -> &str {
        "xlsx_workbook_protection"
    }

    fn applies_to(&self) -> Vec<String> {
        xlsx_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        let Some(f) = artifact.facts().as_xlsx() else {
            return Ok(unexpected_facts(artifact, self.name(), LABEL));
        };

        if f.password_encrypted_workbook {
            return Ok(CheckResult::fail(
                artifact,
                self.name(),
                Severity::Error,
                "Encrypted workbook (password protected)",
            )
            .with_extra("password_encrypted_workbook", true)
            .with_extra("workbook_structure_protected", f.workbook_structure_protected)
            .with_extra("read_error_detail", f.read_error.clone()));
        }
        if let Some(result) = unreadable(artifact, self.name(), LABEL) {
            return Ok(result);
        }

        let result = if f.workbook_structure_protected {
            CheckResult::fail(
                artifact,
                self.name(),
                Severity::Warning,
                "Workbook structure/windows protection enabled",
            )
        } else {
            CheckResult::pass(artifact, self.name(), "OK: no workbook protection")
        };
        Ok(result
            .with_extra("password_encrypted_workbook", false)
            .with_extra("workbook_structure_protected", f.workbook_structure_protected))
    }
}

/// Legacy notes and threaded comments both count.
pub struct XlsxCommentsCheck;

impl Check for XlsxCommentsCheck {
    fn name(&self) -> &str {
        "xlsx_comments"
    }

    fn applies_to(&self) -> Vec<String> {
        xlsx_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        Ok(evaluate(artifact, self.name(), LABEL, Facts::as_xlsx, |f| {
            let (notes, threaded) = (f.comments_count, f.threaded_comments_count);
            let total = notes + threaded;
            none_allowed(artifact, self.name(), total, "OK: no comments/notes", || {
                format!("Found {total} comment(s) (notes={notes}, threaded={threaded})")
            })
            .with_extra("comments_count", notes)
            .with_extra("threaded_comments_count", threaded)
            .with_extra("total_comments", total)
        }))
    }
}

/// An `.xlsx` must not embed `xl/vbaProject.bin`.
pub struct XlsxVbaInXlsxCheck;

impl Check for XlsxVbaInXlsxCheck {
    fn name(&self) -> &str {
        "xlsx_vba_in_xlsx"
    }

    fn applies_to(&self) -> Vec<String> {
        xlsx_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        Ok(evaluate(artifact, self.name(), LABEL, Facts::as_xlsx, |f| {
            let result = if f.has_vba_project {
                CheckResult::fail(
                    artifact,
                    self.name(),
                    Severity::Error,
                    "VBA project embedded in workbook",
                )
            } else {
                CheckResult::pass(artifact, self.name(), "OK: no VBA project")
            };
            result.with_extra("has_vba_project", f.has_vba_project)
        }))
    }
}

/// Fails on any cell filled with classic yellow.
pub struct XlsxYellowCellsCheck;

impl Check for XlsxYellowCellsCheck {
    fn name(&self) -> &str {
        "xlsx_yellow_cells"
    }

    fn applies_to(&self) -> Vec<String> {
        xlsx_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        Ok(evaluate(artifact, self.name(), LABEL, Facts::as_xlsx, |f| {
            let count = f.yellow_cell_count();
            let listed: Vec<Value> = f
                .yellow_cells
                .iter()
                .take(MAX_LISTED_CELLS)
                .map(|c| Value::from(format!("{}!{}", c.sheet, c.cell)))
                .collect();
            none_allowed(artifact, self.name(), count, "OK: no yellow cells", || {
                format!("Found {count} yellow cell(s)")
            })
            .with_extra("yellow_cell_count", count)
            .with_extra("yellow_cells", listed)
        }))
    }
}

/// Fails on any sheet whose tab colour is classic yellow.
pub struct XlsxYellowSheetTabsCheck;

impl Check for XlsxYellowSheetTabsCheck {
    fn name(&self) -> &str {
        "xlsx_yellow_sheet_tabs"
    }

    fn applies_to(&self) -> Vec<String> {
        xlsx_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        Ok(evaluate(artifact, self.name(), LABEL, Facts::as_xlsx, |f| {
            let count = f.yellow_tab_sheets.len();
            none_allowed(artifact, self.name(), count, "OK: no yellow tabs", || {
                format!("Found {count} yellow sheet tab(s): {}", f.yellow_tab_sheets.join(", "))
            })
            .with_extra("yellow_tab_sheet_count", count)
            .with_extra("yellow_tab_sheets", f.yellow_tab_sheets.clone())
        }))
    }
}
