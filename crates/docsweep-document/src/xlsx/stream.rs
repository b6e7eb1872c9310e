// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Streaming workbook adapter.
//
// Every query is a single forward pass over the relevant part's XML events.
// Nothing beyond the small style tables is kept in memory, so this is the
// adapter for locator-only queries on large workbooks.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use docsweep_core::error::Result;
use quick_xml::events::{BytesStart, Event};

use super::color::{ColorRef, ThemePalette, theme_slot_index};
use super::source::{
    STYLES_PART, SheetInfo, SheetState, WORKBOOK_PART, WORKBOOK_RELS_PART, WorkbookSource,
    resolve_workbook_target, theme_part,
};
use super::styles::{FillDef, StyleTables, parse_fill_id, parse_style_index};
use crate::ooxml::{
    Flow, Package, XmlReader, attribute, attributes, element_name, end_name, walk,
};

/// Workbook read one event at a time.
pub struct StreamingWorkbook<R = File> {
    package: Package<R>,
}

impl StreamingWorkbook<File> {
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Package::open(path)?))
    }
}

impl<R: Read + Seek> StreamingWorkbook<R> {
    pub fn new(package: Package<R>) -> Self {
        Self { package }
    }

    fn tab_color(&mut self, part: &str) -> Result<Option<ColorRef>> {
        Ok(self.package.with_xml(part, read_tab_color)?.flatten())
    }
}

impl<R: Read + Seek> WorkbookSource for StreamingWorkbook<R> {
    fn theme_palette(&mut self) -> Result<ThemePalette> {
        let Some(part) = theme_part(self.package.names()) else {
            return Ok(ThemePalette::default());
        };
        Ok(self
            .package
            .with_xml(&part, read_theme)?
            .unwrap_or_default())
    }

    fn style_tables(&mut self) -> Result<StyleTables> {
        Ok(self
            .package
            .with_xml(STYLES_PART, read_styles)?
            .unwrap_or_default())
    }

    fn sheets(&mut self) -> Result<Vec<SheetInfo>> {
        let Some(entries) = self.package.with_xml(WORKBOOK_PART, read_sheet_entries)? else {
            return Ok(Vec::new());
        };
        let targets = self
            .package
            .with_xml(WORKBOOK_RELS_PART, read_relationship_targets)?
            .unwrap_or_default();

        let mut sheets = Vec::with_capacity(entries.len());
        for entry in entries {
            let part = entry
                .rel_id
                .and_then(|id| targets.get(&id).cloned())
                .filter(|p| self.package.contains(p));
            let tab_color = match &part {
                Some(p) => self.tab_color(p)?,
                None => None,
            };
            sheets.push(SheetInfo {
                name: entry.name,
                part,
                state: entry.state,
                tab_color,
            });
        }
        Ok(sheets)
    }

    fn visit_cells(
        &mut self,
        sheet: &SheetInfo,
        visit: &mut dyn FnMut(&str, Option<u32>),
    ) -> Result<()> {
        let Some(part) = &sheet.part else {
            return Ok(());
        };
        self.package.with_xml(part, |reader| {
            walk(reader, |event| {
                if let Event::Start(e) | Event::Empty(e) = event
                    && element_name(e) == "c"
                {
                    let mut reference = None;
                    let mut style = None;
                    for (key, value) in attributes(e)? {
                        match key.as_str() {
                            "r" => reference = Some(value),
                            "s" => style = parse_style_index(Some(value.as_str())),
                            _ => {}
                        }
                    }
                    if let Some(reference) = reference.filter(|r| !r.is_empty()) {
                        visit(&reference, style);
                    }
                }
                Ok(Flow::Continue)
            })
        })?;
        Ok(())
    }
}

fn color_from_tag(e: &BytesStart<'_>) -> Result<ColorRef> {
    let attrs = attributes(e)?;
    Ok(ColorRef::from_attrs(
        attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    ))
}

/// A direct child of `<a:clrScheme>` being read. `index` is `None` for
/// elements that are not colour slots.
struct OpenSlot {
    index: Option<usize>,
    depth: usize,
    filled: bool,
}

fn read_theme(reader: &mut XmlReader<'_>) -> Result<ThemePalette> {
    let mut palette = ThemePalette::default();
    let mut in_scheme = false;
    let mut scheme_done = false;
    let mut open: Option<OpenSlot> = None;

    walk(reader, |event| {
        match event {
            Event::Start(e) | Event::Empty(e) => {
                let is_start = matches!(event, Event::Start(_));
                let name = element_name(e);
                if let Some(slot) = open.as_mut() {
                    if slot.depth == 0
                        && !slot.filled
                        && let Some(index) = slot.index
                    {
                        let value = match name {
                            "srgbClr" => attribute(e, "val")?,
                            "sysClr" => attribute(e, "lastClr")?,
                            _ => None,
                        };
                        if let Some(rgb) = value.filter(|v| !v.trim().is_empty()) {
                            palette.set(index, &rgb);
                            slot.filled = true;
                        }
                    }
                    if is_start {
                        slot.depth += 1;
                    }
                } else if in_scheme {
                    if is_start {
                        open = Some(OpenSlot {
                            index: theme_slot_index(name),
                            depth: 0,
                            filled: false,
                        });
                    }
                } else if name == "clrScheme" && is_start && !scheme_done {
                    in_scheme = true;
                }
            }
            Event::End(e) => {
                if let Some(slot) = open.as_mut() {
                    if slot.depth > 0 {
                        slot.depth -= 1;
                    } else {
                        open = None;
                    }
                } else if in_scheme && end_name(e) == "clrScheme" {
                    in_scheme = false;
                    scheme_done = true;
                }
            }
            _ => {}
        }
        Ok(Flow::Continue)
    })?;
    Ok(palette)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StyleSection {
    Other,
    Fills,
    CellXfs,
}

fn read_styles(reader: &mut XmlReader<'_>) -> Result<StyleTables> {
    let mut tables = StyleTables::default();
    let mut section = StyleSection::Other;
    let mut in_pattern = false;

    walk(reader, |event| {
        match event {
            Event::Start(e) | Event::Empty(e) => {
                let is_start = matches!(event, Event::Start(_));
                match (section, element_name(e)) {
                    (StyleSection::Other, "fills") if is_start => section = StyleSection::Fills,
                    (StyleSection::Other, "cellXfs") if is_start => {
                        section = StyleSection::CellXfs
                    }
                    (StyleSection::Fills, "fill") => tables.fills.push(FillDef::default()),
                    (StyleSection::Fills, "patternFill") => {
                        let pattern = attribute(e, "patternType")?;
                        if let Some(fill) = tables.fills.last_mut() {
                            fill.pattern = pattern;
                        }
                        in_pattern = is_start;
                    }
                    (StyleSection::Fills, name @ ("fgColor" | "bgColor")) if in_pattern => {
                        let color = color_from_tag(e)?;
                        if let Some(fill) = tables.fills.last_mut() {
                            if name == "fgColor" {
                                fill.fg = Some(color);
                            } else {
                                fill.bg = Some(color);
                            }
                        }
                    }
                    (StyleSection::CellXfs, "xf") => {
                        let fill_id = attribute(e, "fillId")?;
                        tables.cell_fills.push(parse_fill_id(fill_id.as_deref()));
                    }
                    _ => {}
                }
            }
            Event::End(e) => match end_name(e) {
                "fills" | "cellXfs" => section = StyleSection::Other,
                "patternFill" => in_pattern = false,
                _ => {}
            },
            _ => {}
        }
        Ok(Flow::Continue)
    })?;
    Ok(tables)
}

struct SheetEntry {
    name: String,
    rel_id: Option<String>,
    state: SheetState,
}

fn read_sheet_entries(reader: &mut XmlReader<'_>) -> Result<Vec<SheetEntry>> {
    let mut entries = Vec::new();
    walk(reader, |event| {
        if let Event::Start(e) | Event::Empty(e) = event
            && element_name(e) == "sheet"
        {
            let attrs = attributes(e)?;
            let get = |key: &str| {
                attrs
                    .iter()
                    .find_map(|(k, v)| (k == key).then(|| v.clone()))
            };
            if let Some(name) = get("name").filter(|n| !n.is_empty()) {
                entries.push(SheetEntry {
                    name,
                    rel_id: get("id"),
                    state: SheetState::parse(get("state").as_deref()),
                });
            }
        }
        Ok(Flow::Continue)
    })?;
    Ok(entries)
}

fn read_relationship_targets(reader: &mut XmlReader<'_>) -> Result<HashMap<String, String>> {
    let mut targets = HashMap::new();
    walk(reader, |event| {
        if let Event::Start(e) | Event::Empty(e) = event
            && element_name(e) == "Relationship"
        {
            let id = attribute(e, "Id")?.filter(|v| !v.is_empty());
            let target = attribute(e, "Target")?.filter(|v| !v.is_empty());
            if let (Some(id), Some(target)) = (id, target) {
                targets.insert(id, resolve_workbook_target(&target));
            }
        }
        Ok(Flow::Continue)
    })?;
    Ok(targets)
}

/// `<sheetPr><tabColor/></sheetPr>`. The rest of the part is still read so
/// that a malformed sheet fails here exactly as it fails a full load.
/// `<tabColor>` lives in `<sheetPr>`, which precedes `<sheetData>`; the walk
/// stops there so cell data is never read.
fn read_tab_color(reader: &mut XmlReader<'_>) -> Result<Option<ColorRef>> {
    let mut in_sheet_pr = false;
    let mut tab_color = None;
    walk(reader, |event| {
        match event {
            Event::Start(e) | Event::Empty(e) => match element_name(e) {
                "sheetData" => return Ok(Flow::Stop),
                "sheetPr" if matches!(event, Event::Start(_)) => in_sheet_pr = true,
                "tabColor" if in_sheet_pr => {
                    tab_color = Some(color_from_tag(e)?);
                    return Ok(Flow::Stop);
                }
                _ => {}
            },
            Event::End(e) if end_name(e) == "sheetPr" => return Ok(Flow::Stop),
            _ => {}
        }
        Ok(Flow::Continue)
    })?;
    Ok(tab_color)
}
