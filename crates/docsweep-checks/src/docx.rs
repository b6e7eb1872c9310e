// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Word document rules: comments, tracked changes and highlighting.

use docsweep_core::error::Result;
use docsweep_core::{Check, CheckResult, Facts, FileArtifact};

use crate::{evaluate, none_allowed};

const LABEL: &str = "DOCX";

fn docx_only() -> Vec<String> {
    vec![".docx".to_owned()]
}

/// Any comment fails, resolved or not.
pub struct DocxNoCommentsCheck;

impl Check for DocxNoCommentsCheck {
    fn name(&self) -> &str {
        "DOCX: no comments"
    }

    fn applies_to(&self) -> Vec<String> {
        docx_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        Ok(evaluate(artifact, self.name(), LABEL, Facts::as_docx, |f| {
            let count = f.comments_count;
            none_allowed(artifact, self.name(), count, "OK: no comments", || {
                format!("Found {count} comment(s)")
            })
            .with_extra("comments_count", count)
        }))
    }
}

/// Revision marks anywhere in the body, headers or footers.
pub struct DocxNoTrackedChangesCheck;

impl Check for DocxNoTrackedChangesCheck {
    fn name(&self) -> &str {
        "DOCX: no tracked changes"
    }

    fn applies_to(&self) -> Vec<String> {
        docx_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        Ok(evaluate(artifact, self.name(), LABEL, Facts::as_docx, |f| {
            let count = f.tracked_changes_count;
            none_allowed(artifact, self.name(), count, "OK: no tracked changes", || {
                format!("Found {count} tracked change(s)")
            })
            .with_extra("tracked_changes_count", count)
        }))
    }
}

/// Explicit highlight runs and filled shading both count.
pub struct DocxNoHighlightsCheck;

impl Check for DocxNoHighlightsCheck {
    fn name(&self) -> &str {
        "DOCX: no highlights"
    }

    fn applies_to(&self) -> Vec<String> {
        docx_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        Ok(evaluate(artifact, self.name(), LABEL, Facts::as_docx, |f| {
            let explicit = f.highlight_run_count;
            let shading = f.shading_highlight_count;
            let total = explicit + shading;
            none_allowed(artifact, self.name(), total, "OK: no highlights", || {
                format!(
                    "Found {total} highlighted region(s) (explicit={explicit}, shading={shading})"
                )
            })
            .with_extra("highlight_run_count", explicit)
            .with_extra("shading_highlight_count", shading)
            .with_extra("total_highlight_like", total)
        }))
    }
}
