// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Object-model workbook adapter.
//
// Loads the theme, styles, workbook and every sheet into element trees up
// front, then lifts them into typed sheets, cells and fills. Queries after
// `load` never touch the package again.

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use docsweep_core::error::{DocsweepError, Result};
use tracing::{debug, instrument, warn};

use super::color::{ColorRef, ThemePalette, theme_slot_index};
use super::source::{
    STYLES_PART, SheetInfo, SheetState, WORKBOOK_PART, WORKBOOK_RELS_PART, WorkbookSource,
    resolve_workbook_target, theme_part,
};
use super::styles::{FillDef, StyleTables, parse_fill_id, parse_style_index};
use crate::ooxml::{Package, XmlNode};

/// A styled cell as declared in `<sheetData>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub reference: String,
    pub style: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub info: SheetInfo,
    pub cells: Vec<Cell>,
}

/// A fully materialised workbook.
#[derive(Debug, Clone)]
pub struct WorkbookModel {
    theme: std::result::Result<ThemePalette, String>,
    styles: std::result::Result<StyleTables, String>,
    sheets: Vec<Sheet>,
}

impl WorkbookModel {
    pub fn open(path: &Path) -> Result<Self> {
        let mut package = Package::open(path)?;
        Self::load(&mut package)
    }

    /// Read every colour-bearing part of `package`.
    ///
    /// A missing or malformed theme or style part is kept as a deferred
    /// error so callers can degrade; workbook and sheet parts must parse.
    #[instrument(skip_all)]
    pub fn load<R: Read + Seek>(package: &mut Package<R>) -> Result<Self> {
        let theme = match theme_part(package.names()) {
            None => Ok(ThemePalette::default()),
            Some(part) => match package.parse_part(&part) {
                Ok(node) => Ok(node.as_ref().map(palette_from_theme).unwrap_or_default()),
                Err(err) => {
                    warn!(part = %part, error = %err, "theme part unreadable");
                    Err(err.to_string())
                }
            },
        };

        let styles = match package.parse_part(STYLES_PART) {
            Ok(node) => Ok(node.as_ref().map(tables_from_styles).unwrap_or_default()),
            Err(err) => {
                warn!(error = %err, "styles part unreadable");
                Err(err.to_string())
            }
        };

        let sheets = load_sheets(package)?;
        debug!(sheets = sheets.len(), "workbook model loaded");

        Ok(Self {
            theme,
            styles,
            sheets,
        })
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.info.name == name)
    }
}

impl WorkbookSource for WorkbookModel {
    fn theme_palette(&mut self) -> Result<ThemePalette> {
        self.theme.clone().map_err(DocsweepError::Xml)
    }

    fn style_tables(&mut self) -> Result<StyleTables> {
        self.styles.clone().map_err(DocsweepError::Xml)
    }

    fn sheets(&mut self) -> Result<Vec<SheetInfo>> {
        Ok(self.sheets.iter().map(|s| s.info.clone()).collect())
    }

    fn visit_cells(
        &mut self,
        sheet: &SheetInfo,
        visit: &mut dyn FnMut(&str, Option<u32>),
    ) -> Result<()> {
        let found = self
            .sheets
            .iter()
            .find(|s| s.info.name == sheet.name && s.info.part == sheet.part);
        for cell in found.map(|s| s.cells.as_slice()).unwrap_or_default() {
            visit(&cell.reference, cell.style);
        }
        Ok(())
    }
}

fn color_from_node(node: &XmlNode) -> ColorRef {
    ColorRef::from_attrs(node.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

fn palette_from_theme(root: &XmlNode) -> ThemePalette {
    let mut palette = ThemePalette::default();
    let Some(scheme) = root.find("clrScheme") else {
        return palette;
    };
    for slot in &scheme.children {
        let Some(index) = theme_slot_index(&slot.name) else {
            continue;
        };
        let rgb = slot.children.iter().find_map(|c| {
            match c.name.as_str() {
                "srgbClr" => c.attr("val"),
                "sysClr" => c.attr("lastClr"),
                _ => None,
            }
            .filter(|v| !v.trim().is_empty())
        });
        if let Some(rgb) = rgb {
            palette.set(index, rgb);
        }
    }
    palette
}

fn tables_from_styles(root: &XmlNode) -> StyleTables {
    let fills = root
        .child("fills")
        .map(|fills| {
            fills
                .children_named("fill")
                .map(|fill| match fill.child("patternFill") {
                    Some(pattern) => FillDef {
                        pattern: pattern.attr("patternType").map(str::to_owned),
                        fg: pattern.child("fgColor").map(color_from_node),
                        bg: pattern.child("bgColor").map(color_from_node),
                    },
                    None => FillDef::default(),
                })
                .collect()
        })
        .unwrap_or_default();

    let cell_fills = root
        .child("cellXfs")
        .map(|xfs| {
            xfs.children_named("xf")
                .map(|xf| parse_fill_id(xf.attr("fillId")))
                .collect()
        })
        .unwrap_or_default();

    StyleTables { cell_fills, fills }
}

fn load_sheets<R: Read + Seek>(package: &mut Package<R>) -> Result<Vec<Sheet>> {
    let Some(workbook) = package.parse_part(WORKBOOK_PART)? else {
        return Ok(Vec::new());
    };
    let targets: HashMap<String, String> = match package.parse_part(WORKBOOK_RELS_PART)? {
        Some(rels) => rels
            .descendants("Relationship")
            .into_iter()
            .filter_map(|rel| {
                let id = rel.attr("Id").filter(|v| !v.is_empty())?;
                let target = rel.attr("Target").filter(|v| !v.is_empty())?;
                Some((id.to_owned(), resolve_workbook_target(target)))
            })
            .collect(),
        None => HashMap::new(),
    };

    let mut sheets = Vec::new();
    for entry in workbook.descendants("sheet") {
        let Some(name) = entry.attr("name").filter(|n| !n.is_empty()) else {
            continue;
        };
        let part = entry
            .attr("id")
            .and_then(|id| targets.get(id).cloned())
            .filter(|p| package.contains(p));

        let root = match &part {
            Some(p) => package.parse_part(p)?,
            None => None,
        };
        let tab_color = root
            .as_ref()
            .and_then(|r| r.child("sheetPr"))
            .and_then(|pr| pr.child("tabColor"))
            .map(color_from_node);
        let cells = root
            .as_ref()
            .map(|r| {
                r.descendants("c")
                    .into_iter()
                    .filter_map(|c| {
                        let reference = c.attr("r").filter(|r| !r.is_empty())?;
                        Some(Cell {
                            reference: reference.to_owned(),
                            style: parse_style_index(c.attr("s")),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        sheets.push(Sheet {
            info: SheetInfo {
                name: name.to_owned(),
                part,
                state: SheetState::parse(entry.attr("state")),
                tab_color,
            },
            cells,
        });
    }
    Ok(sheets)
}
