// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Style tables and the per-workbook fill classification.
//
// Chain: cell `s` -> `<cellXfs>` entry -> `fillId` -> `<fills>` entry. Only
// solid pattern fills can be yellow; either foreground or background colour
// matching is enough.

use std::collections::HashSet;

use super::color::{ColorRef, ThemePalette, is_classic_yellow};

/// Pattern type that makes a fill count as a highlight.
pub const SOLID_PATTERN: &str = "solid";

/// One entry of the `<fills>` table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FillDef {
    /// `patternType` of the `<patternFill>`, absent for gradient fills.
    pub pattern: Option<String>,
    pub fg: Option<ColorRef>,
    pub bg: Option<ColorRef>,
}

impl FillDef {
    pub fn solid(fg: Option<ColorRef>, bg: Option<ColorRef>) -> Self {
        Self {
            pattern: Some(SOLID_PATTERN.to_owned()),
            fg,
            bg,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.pattern.as_deref() == Some(SOLID_PATTERN)
    }

    pub fn is_classic_yellow(&self, palette: &ThemePalette) -> bool {
        self.is_solid()
            && [&self.fg, &self.bg]
                .into_iter()
                .flatten()
                .any(|color| is_classic_yellow(color, palette))
    }
}

/// The two tables of `xl/styles.xml` the engine needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleTables {
    /// `fillId` of each `<cellXfs>/<xf>`, in order.
    pub cell_fills: Vec<u32>,
    pub fills: Vec<FillDef>,
}

/// Parse an `xf@fillId` value; missing or malformed means fill 0.
pub fn parse_fill_id(value: Option<&str>) -> u32 {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}

/// Parse a cell `s` attribute; malformed values read as unstyled.
pub fn parse_style_index(value: Option<&str>) -> Option<u32> {
    value.and_then(|v| v.trim().parse().ok())
}

/// Style-to-fill lookup with the yellow fill ids precomputed.
#[derive(Debug, Clone, Default)]
pub struct FillClassifier {
    style_to_fill: Vec<u32>,
    yellow_fills: HashSet<u32>,
}

impl FillClassifier {
    /// Classify every fill once. A workbook without `<cellXfs>` entries
    /// classifies nothing.
    pub fn new(tables: &StyleTables, palette: &ThemePalette) -> Self {
        let yellow_fills = if tables.cell_fills.is_empty() {
            HashSet::new()
        } else {
            tables
                .fills
                .iter()
                .enumerate()
                .filter(|(_, fill)| fill.is_classic_yellow(palette))
                .filter_map(|(id, _)| u32::try_from(id).ok())
                .collect()
        };
        Self {
            style_to_fill: tables.cell_fills.clone(),
            yellow_fills,
        }
    }

    /// Fill id for a cell style. Unstyled cells and unknown styles use fill 0.
    pub fn fill_for_style(&self, style: Option<u32>) -> u32 {
        style
            .and_then(|s| self.style_to_fill.get(s as usize).copied())
            .unwrap_or(0)
    }

    pub fn is_yellow_style(&self, style: Option<u32>) -> bool {
        !self.yellow_fills.is_empty() && self.yellow_fills.contains(&self.fill_for_style(style))
    }

    /// True when no fill in the workbook is yellow.
    pub fn is_empty(&self) -> bool {
        self.yellow_fills.is_empty()
    }

    pub fn yellow_fill_count(&self) -> usize {
        self.yellow_fills.len()
    }
}
