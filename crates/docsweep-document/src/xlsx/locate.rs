// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Yellow cell and sheet-tab locators, written once against `WorkbookSource`.

use std::path::Path;

use docsweep_core::CellLocation;
use docsweep_core::error::Result;
use tracing::{debug, instrument, warn};

use super::color::{ThemePalette, is_classic_yellow};
use super::model::WorkbookModel;
use super::source::{SheetInfo, WorkbookSource};
use super::stream::StreamingWorkbook;
use super::styles::FillClassifier;

/// Which adapter reads the workbook.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Event-driven pass per part.
    #[default]
    Streaming,
    /// Load everything into a typed model first.
    Model,
}

/// Everything the locators found in one workbook.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YellowFindings {
    /// Yellow cells in workbook sheet order, then document order.
    pub cells: Vec<CellLocation>,
    /// Names of sheets whose tab colour is yellow, in workbook order.
    pub tabs: Vec<String>,
}

/// Theme palette, or an empty one when the theme part cannot be read.
pub fn palette_or_empty<S: WorkbookSource + ?Sized>(source: &mut S) -> ThemePalette {
    source.theme_palette().unwrap_or_else(|err| {
        warn!(error = %err, "theme unreadable, theme colours will not match");
        ThemePalette::default()
    })
}

/// Fill classification, or one that matches nothing when styles are unreadable.
pub fn classifier_or_empty<S: WorkbookSource + ?Sized>(
    source: &mut S,
    palette: &ThemePalette,
) -> FillClassifier {
    match source.style_tables() {
        Ok(tables) => FillClassifier::new(&tables, palette),
        Err(err) => {
            warn!(error = %err, "styles unreadable, no cell can be yellow");
            FillClassifier::default()
        }
    }
}

/// Cells and tabs in one pass over the source.
#[instrument(skip_all)]
pub fn locate_yellow<S: WorkbookSource + ?Sized>(source: &mut S) -> Result<YellowFindings> {
    let palette = palette_or_empty(source);
    let sheets = source.sheets()?;
    let tabs = yellow_tabs(&sheets, &palette);
    let cells = yellow_cells(source, &sheets, &palette)?;
    debug!(cells = cells.len(), tabs = tabs.len(), "yellow scan complete");
    Ok(YellowFindings { cells, tabs })
}

/// Every `(sheet, cell)` whose fill resolves to classic yellow.
pub fn list_yellow_cells<S: WorkbookSource + ?Sized>(source: &mut S) -> Result<Vec<CellLocation>> {
    let palette = palette_or_empty(source);
    let sheets = source.sheets()?;
    yellow_cells(source, &sheets, &palette)
}

/// Names of sheets with a classic-yellow tab.
pub fn list_yellow_tabs<S: WorkbookSource + ?Sized>(source: &mut S) -> Result<Vec<String>> {
    let palette = palette_or_empty(source);
    let sheets = source.sheets()?;
    Ok(yellow_tabs(&sheets, &palette))
}

/// Open `path` with the chosen adapter and run both locators.
pub fn locate_yellow_in_file(path: &Path, strategy: Strategy) -> Result<YellowFindings> {
    match strategy {
        Strategy::Streaming => locate_yellow(&mut StreamingWorkbook::open(path)?),
        Strategy::Model => locate_yellow(&mut WorkbookModel::open(path)?),
    }
}

fn yellow_tabs(sheets: &[SheetInfo], palette: &ThemePalette) -> Vec<String> {
    sheets
        .iter()
        .filter(|s| {
            s.tab_color
                .as_ref()
                .is_some_and(|color| is_classic_yellow(color, palette))
        })
        .map(|s| s.name.clone())
        .collect()
}

fn yellow_cells<S: WorkbookSource + ?Sized>(
    source: &mut S,
    sheets: &[SheetInfo],
    palette: &ThemePalette,
) -> Result<Vec<CellLocation>> {
    let classifier = classifier_or_empty(source, palette);
    let mut found = Vec::new();
    if classifier.is_empty() {
        return Ok(found);
    }
    for sheet in sheets {
        source.visit_cells(sheet, &mut |reference, style| {
            if classifier.is_yellow_style(style) {
                found.push(CellLocation {
                    sheet: sheet.name.clone(),
                    cell: reference.to_owned(),
                });
            }
        })?;
    }
    Ok(found)
}
