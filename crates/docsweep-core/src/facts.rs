// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed fact bags attached to a `FileArtifact`.
//
// Each processor family fills exactly one variant. The field set of a variant
// is the contract between that processor and the checks targeting its
// extensions; the orchestrator never looks inside. Third-party processors use
// `Facts::Other` with a string-keyed map.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Processor-specific facts about one file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Facts {
    Xlsx(XlsxFacts),
    Docx(DocxFacts),
    Pptx(PptxFacts),
    Pdf(PdfFacts),
    Other(BTreeMap<String, Value>),
}

impl Facts {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Xlsx(_) => "xlsx",
            Self::Docx(_) => "docx",
            Self::Pptx(_) => "pptx",
            Self::Pdf(_) => "pdf",
            Self::Other(_) => "other",
        }
    }

    pub fn as_xlsx(&self) -> Option<&XlsxFacts> {
        match self {
            Self::Xlsx(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_docx(&self) -> Option<&DocxFacts> {
        match self {
            Self::Docx(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_pptx(&self) -> Option<&PptxFacts> {
        match self {
            Self::Pptx(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_pdf(&self) -> Option<&PdfFacts> {
        match self {
            Self::Pdf(f) => Some(f),
            _ => None,
        }
    }

    /// Diagnostic recorded when the structural read of the file failed.
    pub fn read_error(&self) -> Option<&str> {
        match self {
            Self::Xlsx(f) => f.read_error.as_deref(),
            Self::Docx(f) => f.read_error.as_deref(),
            Self::Pptx(f) => f.read_error.as_deref(),
            Self::Pdf(f) => f.read_error.as_deref(),
            Self::Other(_) => None,
        }
    }

    /// Plain-text sample, for families that extract one.
    pub fn text(&self) -> Option<&TextSample> {
        match self {
            Self::Xlsx(f) => Some(&f.text),
            Self::Docx(f) => Some(&f.text),
            Self::Pptx(f) => Some(&f.text),
            Self::Pdf(f) => Some(&f.text),
            Self::Other(_) => None,
        }
    }

    /// Document-level modification timestamp, when the format records one.
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Xlsx(f) => f.core.modified,
            Self::Docx(f) => f.core.modified,
            Self::Pptx(f) => f.core.modified,
            Self::Pdf(f) => f.mod_date,
            Self::Other(_) => None,
        }
    }
}

/// OPC core properties (`docProps/core.xml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoreProperties {
    pub author: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
}

/// Normalised text extracted for spelling checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextSample {
    pub text: String,
    /// Length in characters.
    pub length: usize,
    pub token_count: usize,
    /// Set when extraction failed; other facts remain valid.
    pub extraction_error: Option<String>,
}

/// A single spreadsheet cell, addressed by sheet display name and A1 reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CellLocation {
    pub sheet: String,
    pub cell: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct XlsxFacts {
    pub core: CoreProperties,

    pub sheet_count: Option<usize>,
    pub hidden_sheet_count: usize,
    pub very_hidden_sheet_count: usize,

    pub formula_count: usize,
    /// Cells typed as errors (`<c t="e">`).
    pub error_cell_count: usize,
    pub formula_ref_error_count: usize,
    pub other_error_token_count: usize,

    pub comments_count: usize,
    pub threaded_comments_count: usize,

    pub external_links_count: usize,
    pub data_connections_count: usize,

    pub workbook_structure_protected: bool,
    pub password_encrypted_workbook: bool,
    pub has_vba_project: bool,

    pub yellow_cells: Vec<CellLocation>,
    pub yellow_tab_sheets: Vec<String>,

    pub text: TextSample,
    pub read_error: Option<String>,
}

impl XlsxFacts {
    pub fn yellow_cell_count(&self) -> usize {
        self.yellow_cells.len()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DocxFacts {
    pub core: CoreProperties,
    pub paragraph_count: Option<usize>,
    pub table_count: Option<usize>,
    pub comments_count: usize,
    pub tracked_changes_count: usize,
    /// Runs carrying an explicit `<w:highlight>`.
    pub highlight_run_count: usize,
    /// `<w:shd>` elements with a non-auto fill.
    pub shading_highlight_count: usize,
    pub text: TextSample,
    pub read_error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PptxFacts {
    pub core: CoreProperties,
    pub slide_count: Option<usize>,
    pub total_shapes: Option<usize>,
    pub has_any_notes: Option<bool>,
    pub comments_count: usize,
    pub text: TextSample,
    pub read_error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PdfFacts {
    pub encrypted: bool,
    pub pages: Option<usize>,
    /// Annotation subtype (without the leading `/`) to occurrence count.
    pub annots_summary: BTreeMap<String, usize>,
    pub mod_date: Option<DateTime<Utc>>,
    pub text: TextSample,
    pub read_error: Option<String>,
}

impl PdfFacts {
    /// Total annotations of the given subtypes.
    pub fn count_annots(&self, subtypes: &[&str]) -> usize {
        subtypes
            .iter()
            .filter_map(|s| self.annots_summary.get(*s))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_route_by_family() {
        let facts = Facts::Docx(DocxFacts {
            read_error: Some("bad zip".into()),
            ..DocxFacts::default()
        });
        assert_eq!(facts.kind(), "docx");
        assert_eq!(facts.read_error(), Some("bad zip"));
        assert!(facts.text().is_some());
        assert!(facts.as_docx().is_some());
        assert!(facts.as_xlsx().is_none());

        let other = Facts::Other(BTreeMap::new());
        assert!(other.text().is_none());
        assert!(other.modified().is_none());
    }

    #[test]
    fn pdf_annotation_totals() {
        let mut pdf = PdfFacts::default();
        pdf.annots_summary.insert("Text".into(), 2);
        pdf.annots_summary.insert("Highlight".into(), 5);
        assert_eq!(pdf.count_annots(&["Text", "FreeText"]), 2);
        assert_eq!(pdf.count_annots(&["Highlight", "Text"]), 7);
    }
}
