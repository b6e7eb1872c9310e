// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spreadsheet (.xlsx) support — the classic-yellow style engine, its two
// workbook adapters, and the processor.

pub mod color;
pub mod locate;
pub mod model;
pub mod processor;
pub mod source;
pub mod stream;
pub mod styles;

pub use color::{ColorRef, ThemePalette, apply_tint, is_classic_yellow, normalize_rgb};
pub use locate::{
    Strategy, YellowFindings, list_yellow_cells, list_yellow_tabs, locate_yellow,
    locate_yellow_in_file,
};
pub use model::WorkbookModel;
pub use processor::XlsxProcessor;
pub use source::{SheetInfo, SheetState, WorkbookSource};
pub use stream::StreamingWorkbook;
pub use styles::{FillClassifier, FillDef, StyleTables};
