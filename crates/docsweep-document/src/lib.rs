// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsweep-document — Readers and processors for the supported document
// families.
//
// Provides the OOXML package reader, the spreadsheet style engine that finds
// classic-yellow cells and sheet tabs, PDF inspection via `lopdf`, plain-text
// sampling, and one `Processor` per file family.

pub mod docx;
pub mod ooxml;
pub mod pdf;
pub mod pptx;
pub mod text;
pub mod xlsx;

// Re-export the processors so the bootstrap can use `docsweep_document::XlsxProcessor` etc.
pub use docx::DocxProcessor;
pub use pdf::PdfProcessor;
pub use pptx::PptxProcessor;
pub use xlsx::XlsxProcessor;

/// Append a stage-tagged failure to a `read_error` diagnostic.
pub(crate) fn record_failure(slot: &mut Option<String>, stage: &str, err: &dyn std::fmt::Display) {
    tracing::warn!(stage, error = %err, "extraction step failed");
    let message = format!("{stage}: {err}");
    match slot {
        Some(existing) => {
            existing.push_str("; ");
            existing.push_str(&message);
        }
        None => *slot = Some(message),
    }
}
