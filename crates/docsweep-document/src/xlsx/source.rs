// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The capability the yellow locators are written against. Each adapter only
// decides how the raw tables are read; the colour test and the style chain
// live in `color` and `styles`.

use docsweep_core::error::Result;

use super::color::{ColorRef, ThemePalette};
use super::styles::StyleTables;

pub const WORKBOOK_PART: &str = "xl/workbook.xml";
pub const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub const STYLES_PART: &str = "xl/styles.xml";
pub const THEME_PREFIX: &str = "xl/theme/";

/// Sheet visibility as declared in `xl/workbook.xml`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SheetState {
    #[default]
    Visible,
    Hidden,
    VeryHidden,
}

impl SheetState {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("hidden") => Self::Hidden,
            Some("veryHidden") => Self::VeryHidden,
            _ => Self::Visible,
        }
    }
}

/// One sheet of the workbook, in workbook order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetInfo {
    pub name: String,
    /// Package part holding the sheet, when the relationship resolves.
    pub part: Option<String>,
    pub state: SheetState,
    pub tab_color: Option<ColorRef>,
}

/// Read access to the parts of a workbook that carry colour information.
pub trait WorkbookSource {
    /// Base colours of the first theme part. Absent theme yields an empty
    /// palette; `Err` means the part exists but could not be read.
    fn theme_palette(&mut self) -> Result<ThemePalette>;

    /// Fill and cell-format tables. Absent styles yield empty tables.
    fn style_tables(&mut self) -> Result<StyleTables>;

    /// Sheets in workbook order with visibility and tab colour.
    fn sheets(&mut self) -> Result<Vec<SheetInfo>>;

    /// Call `visit(reference, style)` for every `<c>` of `sheet` that
    /// carries a cell reference.
    fn visit_cells(
        &mut self,
        sheet: &SheetInfo,
        visit: &mut dyn FnMut(&str, Option<u32>),
    ) -> Result<()>;
}

/// Turn a workbook relationship target into a package part name.
///
/// `worksheets/sheet1.xml`, `./worksheets/sheet1.xml` and
/// `/xl/worksheets/sheet1.xml` all become `xl/worksheets/sheet1.xml`.
pub fn resolve_workbook_target(target: &str) -> String {
    let absolute = target.trim().trim_start_matches('/');
    if absolute.starts_with("xl/") {
        return absolute.to_owned();
    }
    let mut relative = absolute;
    while let Some(rest) = relative.strip_prefix("./") {
        relative = rest;
    }
    format!("xl/{relative}")
}

/// First theme part in name order.
pub fn theme_part<'a>(mut names: impl Iterator<Item = &'a str>) -> Option<String> {
    names
        .find(|n| n.starts_with(THEME_PREFIX) && n.ends_with(".xml"))
        .map(str::to_owned)
}
