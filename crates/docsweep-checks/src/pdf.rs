// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF annotation rules.
//
// Comment-like annotations (`Text`, `FreeText`, `Popup`) belong to the
// comments rule; every other subtype is a markup for the highlights rule.
// Encrypted documents cannot be inspected and only produce a WARNING.

use std::collections::BTreeMap;

use docsweep_core::error::Result;
use docsweep_core::{Check, CheckResult, FileArtifact, PdfFacts, Severity};

use crate::{unexpected_facts, unreadable};

const LABEL: &str = "PDF";

/// Annotation subtypes treated as comments.
pub const COMMENT_SUBTYPES: [&str; 3] = ["Text", "FreeText", "Popup"];

fn pdf_only() -> Vec<String> {
    vec![".pdf".to_owned()]
}

/// Readable, unencrypted PDF facts, or the WARNING explaining why not.
fn inspectable<'a>(
    artifact: &'a FileArtifact,
    check: &str,
) -> std::result::Result<&'a PdfFacts, CheckResult> {
    let Some(facts) = artifact.facts().as_pdf() else {
        return Err(unexpected_facts(artifact, check, LABEL));
    };
    if let Some(result) = unreadable(artifact, check, LABEL) {
        return Err(result);
    }
    if facts.encrypted {
        return Err(CheckResult::fail(
            artifact,
            check,
            Severity::Warning,
            "Encrypted PDF: annotations cannot be verified",
        )
        .with_extra("encrypted", true));
    }
    Ok(facts)
}

pub struct PdfNoCommentsCheck;

impl Check for PdfNoCommentsCheck {
    fn name(&self) -> &str {
        "PDF: no comments"
    }

    fn applies_to(&self) -> Vec<String> {
        pdf_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        let facts = match inspectable(artifact, self.name()) {
            Ok(facts) => facts,
            Err(result) => return Ok(result),
        };

        let count = facts.count_annots(&COMMENT_SUBTYPES);
        let mut result = if count == 0 {
            CheckResult::pass(artifact, self.name(), "OK: no comments")
        } else {
            CheckResult::fail(
                artifact,
                self.name(),
                Severity::Error,
                format!("Found {count} comment annotation(s)"),
            )
        };
        for subtype in COMMENT_SUBTYPES {
            result = result.with_extra(
                &format!("comments_{subtype}"),
                facts.annots_summary.get(subtype).copied().unwrap_or(0),
            );
        }
        Ok(result)
    }
}

/// Every annotation that is not a comment: highlights, ink, stamps, links.
pub struct PdfNoHighlightsCheck;

impl Check for PdfNoHighlightsCheck {
    fn name(&self) -> &str {
        "PDF: no highlights/markups/annotations"
    }

    fn applies_to(&self) -> Vec<String> {
        pdf_only()
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        let facts = match inspectable(artifact, self.name()) {
            Ok(facts) => facts,
            Err(result) => return Ok(result),
        };

        let disallowed: BTreeMap<&str, usize> = facts
            .annots_summary
            .iter()
            .filter(|(subtype, count)| !COMMENT_SUBTYPES.contains(&subtype.as_str()) && **count > 0)
            .map(|(subtype, count)| (subtype.as_str(), *count))
            .collect();
        let total: usize = disallowed.values().sum();

        let result = if total == 0 {
            CheckResult::pass(artifact, self.name(), "OK: no highlights/markups/annotations")
        } else {
            CheckResult::fail(
                artifact,
                self.name(),
                Severity::Error,
                format!("Found {total} non-comment annotation(s)"),
            )
        };
        Ok(result
            .with_extra("disallowed_annotations", serde_json::json!(disallowed))
            .with_extra("all_annotations", serde_json::json!(facts.annots_summary)))
    }
}
