// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — inspection of existing PDFs and the `.pdf` processor.

pub mod processor;
pub mod reader;

pub use processor::PdfProcessor;
pub use reader::{PdfReader, parse_pdf_date};
