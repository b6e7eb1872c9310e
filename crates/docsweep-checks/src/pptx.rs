// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Presentation rules. PowerPoint has no tracked changes, so comments are the
// only review artefact checked.

use docsweep_core::error::Result;
use docsweep_core::{Check, CheckResult, Facts, FileArtifact};

use crate::{evaluate, none_allowed};

pub struct PptxNoCommentsCheck;

impl Check for PptxNoCommentsCheck {
    fn name(&self) -> &str {
        "PPTX: no comments"
    }

    fn applies_to(&self) -> Vec<String> {
        vec![".pptx".to_owned()]
    }

    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
        Ok(evaluate(artifact, self.name(), "PPTX", Facts::as_pptx, |f| {
            let count = f.comments_count;
            none_allowed(artifact, self.name(), count, "OK: no comments", || {
                format!("Found {count} comment(s)")
            })
            .with_extra("comments_count", count)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use docsweep_core::{PptxFacts, Severity};

    #[test]
    fn comments_fail() {
        let artifact = testing::pptx(PptxFacts {
            comments_count: 2,
            ..PptxFacts::default()
        });
        let r = PptxNoCommentsCheck.run(&artifact).unwrap();
        assert!(!r.passed);
        assert_eq!(r.severity, Severity::Error);
        assert_eq!(r.extra["comments_count"], 2);
    }

    #[test]
    fn no_comments_passes() {
        let artifact = testing::pptx(PptxFacts::default());
        let r = PptxNoCommentsCheck.run(&artifact).unwrap();
        assert!(r.passed);
        assert_eq!(r.message, "OK: no comments");
    }

    #[test]
    fn unreadable_presentation_warns() {
        let artifact = testing::pptx(PptxFacts {
            read_error: Some("slides: unbalanced end tag".into()),
            ..PptxFacts::default()
        });
        let r = PptxNoCommentsCheck.run(&artifact).unwrap();
        assert_eq!(r.severity, Severity::Warning);
        assert_eq!(r.extra["read_error_detail"], "slides: unbalanced end tag");
    }
}
