// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic OOXML packages for the integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub type Parts = Vec<(&'static str, String)>;

/// Zip `parts` into an in-memory package.
pub fn package_bytes(parts: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in parts {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Zip `parts` into `dir/file_name` and return the path.
pub fn write_package(dir: &Path, file_name: &str, parts: &[(&str, String)]) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, package_bytes(parts)).unwrap();
    path
}

/// Replace (or add) one part.
pub fn with_part(parts: Parts, name: &'static str, content: &str) -> Parts {
    let mut parts = without_part(parts, name);
    parts.push((name, content.to_owned()));
    parts
}

pub fn without_part(mut parts: Parts, name: &'static str) -> Parts {
    parts.retain(|(n, _)| *n != name);
    parts
}

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

pub const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office">
  <a:themeElements>
    <a:clrScheme name="Fixture">
      <a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>
      <a:lt1><a:sysClr val="window" lastClr="FFFFFF"/></a:lt1>
      <a:dk2><a:srgbClr val="44546A"/></a:dk2>
      <a:lt2><a:srgbClr val="E7E6E6"/></a:lt2>
      <a:accent1><a:srgbClr val="FFFF00"/></a:accent1>
      <a:accent2><a:srgbClr val="ED7D31"/></a:accent2>
      <a:accent3><a:srgbClr val="A5A5A5"/></a:accent3>
      <a:accent4><a:srgbClr val="FFC000"/></a:accent4>
      <a:accent5><a:srgbClr val="5B9BD5"/></a:accent5>
      <a:accent6><a:srgbClr val="70AD47"/></a:accent6>
      <a:hlink><a:srgbClr val="0563C1"/></a:hlink>
      <a:folHlink><a:srgbClr val="954F72"/></a:folHlink>
    </a:clrScheme>
  </a:themeElements>
</a:theme>"#;

/// Fill ids and their expected classification:
///
/// | id | fill                                   | yellow |
/// |----|----------------------------------------|--------|
/// | 0  | none                                   | no     |
/// | 1  | gray125                                | no     |
/// | 2  | solid, fg ARGB FFFFFF00                | yes    |
/// | 3  | solid, fg theme accent1                | yes    |
/// | 4  | solid, fg theme accent1, tint -0.5     | no     |
/// | 5  | solid, fg indexed 6                    | yes    |
/// | 6  | darkGray, fg FFFF00                    | no     |
/// | 7  | solid, fg green, bg FFFF00             | yes    |
///
/// `cellXfs` entry `n` points at fill `n`.
pub fn styles() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="{MAIN_NS}">
  <fills count="8">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/><bgColor indexed="64"/></patternFill></fill>
    <fill><patternFill patternType="solid"><fgColor theme="4"/><bgColor indexed="64"/></patternFill></fill>
    <fill><patternFill patternType="solid"><fgColor theme="4" tint="-0.5"/><bgColor indexed="64"/></patternFill></fill>
    <fill><patternFill patternType="solid"><fgColor indexed="6"/><bgColor indexed="64"/></patternFill></fill>
    <fill><patternFill patternType="darkGray"><fgColor rgb="FFFFFF00"/></patternFill></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FF00FF00"/><bgColor rgb="FFFFFF00"/></patternFill></fill>
  </fills>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="8">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="0" fillId="1" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="0" fillId="2" borderId="0" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="0" fillId="3" borderId="0" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="0" fillId="4" borderId="0" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="0" fillId="5" borderId="0" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="0" fillId="6" borderId="0" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="0" fillId="7" borderId="0" xfId="0" applyFill="1"/>
  </cellXfs>
</styleSheet>"#
    )
}

/// One worksheet part; `cells` are `(reference, style)` pairs in row 1.
pub fn sheet(tab_color: Option<&str>, cells: &[(&str, Option<u32>)]) -> String {
    let sheet_pr = tab_color
        .map(|attrs| format!("<sheetPr><tabColor {attrs}/></sheetPr>"))
        .unwrap_or_default();
    let cells: String = cells
        .iter()
        .map(|(reference, style)| match style {
            Some(s) => format!(r#"<c r="{reference}" s="{s}"><v>1</v></c>"#),
            None => format!(r#"<c r="{reference}"><v>1</v></c>"#),
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{MAIN_NS}" xmlns:r="{REL_NS}">{sheet_pr}<sheetData><row r="1">{cells}</row></sheetData></worksheet>"#
    )
}

/// Workbook part listing `(name, state, relationship id)` in tab order.
pub fn workbook(sheets: &[(&str, Option<&str>, &str)]) -> String {
    let entries: String = sheets
        .iter()
        .enumerate()
        .map(|(i, (name, state, rel))| {
            let state = state.map(|s| format!(r#" state="{s}""#)).unwrap_or_default();
            format!(
                r#"<sheet name="{name}" sheetId="{}"{state} r:id="{rel}"/>"#,
                i + 1
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>{entries}</sheets></workbook>"#
    )
}

/// Relationships part from `(id, target, external)` triples.
pub fn relationships(rels: &[(&str, &str, bool)]) -> String {
    let entries: String = rels
        .iter()
        .map(|(id, target, external)| {
            let mode = if *external { r#" TargetMode="External""# } else { "" };
            format!(
                r#"<Relationship Id="{id}" Type="{REL_NS}/worksheet" Target="{target}"{mode}/>"#
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{PKG_REL_NS}">{entries}</Relationships>"#
    )
}

/// Two-sheet workbook exercising every colour encoding.
///
/// Expected yellow cells: `Data!B1`, `Data!C1`, `Data!E1`, `Data!G1`,
/// `Notes!A1`. Expected yellow tabs: `Data`.
pub fn yellow_workbook() -> Parts {
    vec![
        (
            "xl/workbook.xml",
            workbook(&[("Data", None, "rId1"), ("Notes", Some("hidden"), "rId2")]),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            relationships(&[
                ("rId1", "worksheets/sheet1.xml", false),
                ("rId2", "/xl/worksheets/sheet2.xml", false),
            ]),
        ),
        ("xl/styles.xml", styles()),
        ("xl/theme/theme1.xml", THEME.to_owned()),
        (
            "xl/worksheets/sheet1.xml",
            sheet(
                Some(r#"rgb="FFFFFF00""#),
                &[
                    ("A1", Some(1)),
                    ("B1", Some(2)),
                    ("C1", Some(3)),
                    ("D1", Some(4)),
                    ("E1", Some(5)),
                    ("F1", Some(6)),
                    ("G1", Some(7)),
                    ("H1", None),
                    ("I1", Some(99)),
                ],
            ),
        ),
        (
            "xl/worksheets/sheet2.xml",
            sheet(Some(r#"theme="4" tint="0.5""#), &[("A1", Some(2))]),
        ),
    ]
}

/// Core properties part.
pub fn core_properties(creator: &str, modified: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:creator>{creator}</dc:creator><dcterms:modified xsi:type="dcterms:W3CDTF">{modified}</dcterms:modified></cp:coreProperties>"#
    )
}
