// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spreadsheet colour references and the classic-yellow test.
//
// A colour may be declared as direct RGB/ARGB, as a legacy palette index, or
// as a theme slot adjusted by a tint. All three are reconciled here; the
// adapters only ever hand over raw attribute values.

/// The canonical highlight colour, as normalised RGB.
pub const CLASSIC_YELLOW: &str = "FFFF00";

/// Built-in legacy palette slot for yellow.
pub const YELLOW_PALETTE_INDEX: u32 = 6;

/// Theme slot names in index order.
pub const THEME_SLOTS: [&str; 12] = [
    "lt1", "dk1", "lt2", "dk2", "accent1", "accent2", "accent3", "accent4", "accent5", "accent6",
    "hlink", "folHlink",
];

/// Theme index of a `<a:clrScheme>` child element, by local name.
pub fn theme_slot_index(local_name: &str) -> Option<usize> {
    THEME_SLOTS.iter().position(|slot| *slot == local_name)
}

/// A colour as declared on `<fgColor>`, `<bgColor>`, or `<tabColor>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorRef {
    pub rgb: Option<String>,
    pub indexed: Option<u32>,
    pub theme: Option<u32>,
    pub tint: Option<f64>,
}

impl ColorRef {
    /// Build from `(local name, value)` attribute pairs. Unparseable numbers
    /// are dropped, an unparseable tint reads as no tint.
    pub fn from_attrs<'a, I>(attrs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut color = Self::default();
        for (key, value) in attrs {
            let value = value.trim();
            match key {
                "rgb" => color.rgb = Some(value.to_owned()),
                "indexed" => color.indexed = value.parse().ok(),
                "theme" => color.theme = value.parse().ok(),
                "tint" => color.tint = value.parse().ok(),
                _ => {}
            }
        }
        color
    }

    pub fn rgb(value: &str) -> Self {
        Self {
            rgb: Some(value.to_owned()),
            ..Self::default()
        }
    }

    pub fn indexed(index: u32) -> Self {
        Self {
            indexed: Some(index),
            ..Self::default()
        }
    }

    pub fn theme(index: u32, tint: Option<f64>) -> Self {
        Self {
            theme: Some(index),
            tint,
            ..Self::default()
        }
    }
}

/// Last six characters, uppercased: `"00ffff00"` becomes `"FFFF00"`.
/// Shorter input is only uppercased.
pub fn normalize_rgb(value: &str) -> String {
    let upper = value.trim().to_uppercase();
    let len = upper.chars().count();
    if len >= 6 {
        upper.chars().skip(len - 6).collect()
    } else {
        upper
    }
}

fn parse_rgb(value: &str) -> Option<[u8; 3]> {
    let hex = normalize_rgb(value);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Apply an Office tint to an RGB hex string.
///
/// Negative tints darken (`c * (1 + t)`), non-negative tints lighten
/// (`c + (255 - c) * t`). Channels are rounded half-to-even and clamped to
/// `0..=255`. Input that is not six hex digits comes back normalised but
/// otherwise untouched.
pub fn apply_tint(rgb: &str, tint: f64) -> String {
    let Some(channels) = parse_rgb(rgb) else {
        return normalize_rgb(rgb);
    };
    let adjust = |c: u8| -> u8 {
        let c = f64::from(c);
        let value = if tint < 0.0 {
            c * (1.0 + tint)
        } else {
            c + (255.0 - c) * tint
        };
        value.round_ties_even().clamp(0.0, 255.0) as u8
    };
    let [r, g, b] = channels.map(adjust);
    format!("{r:02X}{g:02X}{b:02X}")
}

/// Base colours of a workbook theme, indexed by slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemePalette {
    slots: [Option<String>; 12],
}

impl ThemePalette {
    /// Record the base colour of slot `index`; out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, rgb: &str) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = Some(normalize_rgb(rgb));
        }
    }

    pub fn get(&self, index: u32) -> Option<&str> {
        self.slots.get(index as usize)?.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Resolve a theme slot plus optional tint to normalised RGB.
    pub fn resolve(&self, theme: u32, tint: Option<f64>) -> Option<String> {
        let base = self.get(theme)?;
        match tint {
            Some(t) if t != 0.0 => Some(apply_tint(base, t)),
            _ => Some(base.to_owned()),
        }
    }
}

/// Whether `color` denotes classic yellow under any of its encodings.
pub fn is_classic_yellow(color: &ColorRef, palette: &ThemePalette) -> bool {
    if color
        .rgb
        .as_deref()
        .is_some_and(|rgb| normalize_rgb(rgb) == CLASSIC_YELLOW)
    {
        return true;
    }
    if color.indexed == Some(YELLOW_PALETTE_INDEX) {
        return true;
    }
    color
        .theme
        .and_then(|theme| palette.resolve(theme, color.tint))
        .is_some_and(|rgb| normalize_rgb(&rgb) == CLASSIC_YELLOW)
}
