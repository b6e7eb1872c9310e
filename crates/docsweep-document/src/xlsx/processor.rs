// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `.xlsx` processor — builds `XlsxFacts` from the package.
//
// Each extraction step degrades on its own: a failure is appended to
// `read_error` and the remaining steps still run.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use docsweep_core::error::Result;
use docsweep_core::{Facts, FileArtifact, Processor, ScanConfig, XlsxFacts};
use quick_xml::events::Event;
use tracing::{debug, instrument};

use super::locate::locate_yellow;
use super::model::WorkbookModel;
use super::source::{SheetState, WORKBOOK_PART, WORKBOOK_RELS_PART};
use crate::ooxml::{
    Flow, Package, XmlReader, attribute, attributes, element_name, end_name, event_text,
    sort_by_part_number, walk,
};
use crate::record_failure;
use crate::text::{self, TextCollector};

/// Leading bytes of an OLE compound file: an encrypted workbook or a legacy
/// binary one, never a plain OOXML package.
const OLE_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];

/// Calculation error tokens other than `#REF!`.
const ERROR_TOKENS: [&str; 7] = [
    "#DIV/0!",
    "#NAME?",
    "#VALUE!",
    "#NUM!",
    "#N/A",
    "#NULL!",
    "#GETTING_DATA",
];

pub struct XlsxProcessor {
    max_text_chars: usize,
    extract_text: bool,
}

impl XlsxProcessor {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            max_text_chars: config.max_text_chars,
            extract_text: config.enable_spelling,
        }
    }

    fn inspect(&self, path: &Path) -> XlsxFacts {
        let mut facts = XlsxFacts::default();

        match is_ole_container(path) {
            Ok(true) => {
                facts.password_encrypted_workbook = true;
                facts.read_error =
                    Some("encrypted or non-OOXML container (OLE compound file)".to_owned());
                return facts;
            }
            Ok(false) => {}
            Err(err) => record_failure(&mut facts.read_error, "header", &err),
        }

        let mut package = match Package::open(path) {
            Ok(package) => package,
            Err(err) => {
                record_failure(&mut facts.read_error, "package", &err);
                return facts;
            }
        };

        match package.core_properties() {
            Ok(core) => facts.core = core,
            Err(err) => record_failure(&mut facts.read_error, "core-properties", &err),
        }

        let mut sheet_parts = Vec::new();
        match WorkbookModel::load(&mut package) {
            Ok(mut model) => {
                let sheets = model.sheets();
                sheet_parts = sheets.iter().filter_map(|s| s.info.part.clone()).collect();
                facts.sheet_count = Some(sheets.len());
                facts.hidden_sheet_count = sheets
                    .iter()
                    .filter(|s| s.info.state == SheetState::Hidden)
                    .count();
                facts.very_hidden_sheet_count = sheets
                    .iter()
                    .filter(|s| s.info.state == SheetState::VeryHidden)
                    .count();

                match locate_yellow(&mut model) {
                    Ok(found) => {
                        facts.yellow_cells = found.cells;
                        facts.yellow_tab_sheets = found.tabs;
                    }
                    Err(err) => record_failure(&mut facts.read_error, "yellow-scan", &err),
                }
            }
            Err(err) => record_failure(&mut facts.read_error, "workbook", &err),
        }

        if let Err(err) = scan_structure(&mut package, &mut facts) {
            record_failure(&mut facts.read_error, "zip-scan", &err);
        }

        if self.extract_text {
            facts.text = match extract_text(&mut package, sheet_parts, self.max_text_chars) {
                Ok(sample) => text::sample(sample),
                Err(err) => {
                    debug!(error = %err, "text extraction failed");
                    text::failed_sample(&err)
                }
            };
        }

        facts
    }
}

impl Default for XlsxProcessor {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl Processor for XlsxProcessor {
    fn name(&self) -> &str {
        "XlsxProcessor"
    }

    fn supports(&self) -> Vec<String> {
        vec![".xlsx".to_owned()]
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn build_artifact(&self, path: &Path) -> Result<FileArtifact> {
        let size_bytes = std::fs::metadata(path)?.len();
        let facts = self.inspect(path);
        debug!(
            sheets = ?facts.sheet_count,
            yellow_cells = facts.yellow_cell_count(),
            read_error = facts.read_error.is_some(),
            "xlsx facts extracted"
        );
        Ok(FileArtifact::new(path, ".xlsx", size_bytes, Facts::Xlsx(facts)))
    }
}

fn is_ole_container(path: &Path) -> std::io::Result<bool> {
    let mut magic = [0u8; 4];
    let mut file = File::open(path)?;
    let mut read = 0;
    while read < magic.len() {
        match file.read(&mut magic[read..])? {
            0 => return Ok(false),
            n => read += n,
        }
    }
    Ok(magic == OLE_MAGIC)
}

fn scan_structure<R: Read + Seek>(package: &mut Package<R>, facts: &mut XlsxFacts) -> Result<()> {
    facts.has_vba_project = package.contains("xl/vbaProject.bin");

    facts.workbook_structure_protected = package
        .with_xml(WORKBOOK_PART, read_workbook_protection)?
        .unwrap_or(false);

    facts.external_links_count = package
        .with_xml(WORKBOOK_RELS_PART, count_external_relationships)?
        .unwrap_or(0)
        + package.parts_matching("xl/externalLinks/", ".xml").len();

    facts.data_connections_count = package.count_elements("xl/connections.xml", &["connection"])?;

    for part in package.parts_matching("xl/comments", ".xml") {
        facts.comments_count += package.count_elements(&part, &["comment"])?;
    }
    for part in package.parts_matching("xl/threadedComments/", ".xml") {
        facts.threaded_comments_count += package.count_elements(&part, &["threadedComment"])?;
    }

    for part in package.parts_matching("xl/worksheets/sheet", ".xml") {
        let tally = package.with_xml(&part, tally_formulas)?.unwrap_or_default();
        facts.formula_count += tally.formulas;
        facts.error_cell_count += tally.error_cells;
        facts.formula_ref_error_count += tally.ref_errors;
        facts.other_error_token_count += tally.other_error_tokens;
    }
    Ok(())
}

/// `<workbookProtection>` with at least one attribute.
fn read_workbook_protection(reader: &mut XmlReader<'_>) -> Result<bool> {
    let mut protected = false;
    walk(reader, |event| {
        if let Event::Start(e) | Event::Empty(e) = event
            && element_name(e) == "workbookProtection"
            && !attributes(e)?.is_empty()
        {
            protected = true;
        }
        Ok(Flow::Continue)
    })?;
    Ok(protected)
}

fn looks_external(target: &str) -> bool {
    let t = target.trim().to_lowercase();
    ["http://", "https://", "ftp://", "\\\\"]
        .iter()
        .any(|prefix| t.starts_with(prefix))
}

fn count_external_relationships(reader: &mut XmlReader<'_>) -> Result<usize> {
    let mut count = 0;
    walk(reader, |event| {
        if let Event::Start(e) | Event::Empty(e) = event
            && element_name(e) == "Relationship"
        {
            let mode = attribute(e, "TargetMode")?.unwrap_or_default();
            let target = attribute(e, "Target")?.unwrap_or_default();
            if mode == "External" || looks_external(&target) {
                count += 1;
            }
        }
        Ok(Flow::Continue)
    })?;
    Ok(count)
}

#[derive(Debug, Default)]
struct FormulaTally {
    formulas: usize,
    error_cells: usize,
    ref_errors: usize,
    other_error_tokens: usize,
}

fn tally_formulas(reader: &mut XmlReader<'_>) -> Result<FormulaTally> {
    let mut tally = FormulaTally::default();
    let mut formula: Option<String> = None;
    let mut value: Option<String> = None;

    walk(reader, |event| {
        match event {
            Event::Start(e) | Event::Empty(e) => {
                let is_start = matches!(event, Event::Start(_));
                match element_name(e) {
                    "f" if is_start => formula = Some(String::new()),
                    // Shared-formula reference without a body.
                    "f" => tally.formulas += 1,
                    "v" if is_start => value = Some(String::new()),
                    "c" => {
                        let cell_type = attribute(e, "t")?.unwrap_or_default();
                        if cell_type.trim().eq_ignore_ascii_case("e") {
                            tally.error_cells += 1;
                        }
                    }
                    _ => {}
                }
            }
            Event::End(e) => match end_name(e) {
                "f" => {
                    if let Some(text) = formula.take() {
                        let text = text.trim();
                        tally.formulas += 1;
                        if text.contains("#REF!") {
                            tally.ref_errors += 1;
                        }
                        if ERROR_TOKENS.iter().any(|tok| text.contains(tok)) {
                            tally.other_error_tokens += 1;
                        }
                    }
                }
                "v" => {
                    if let Some(text) = value.take()
                        && ERROR_TOKENS.contains(&text.trim())
                    {
                        tally.other_error_tokens += 1;
                    }
                }
                _ => {}
            },
            other => {
                if let Some(chunk) = event_text(other)? {
                    if let Some(text) = formula.as_mut() {
                        text.push_str(&chunk);
                    } else if let Some(text) = value.as_mut() {
                        text.push_str(&chunk);
                    }
                }
            }
        }
        Ok(Flow::Continue)
    })?;
    Ok(tally)
}

// ---------------------------------------------------------------------------
// Text sample
// ---------------------------------------------------------------------------

/// String cell contents of every worksheet, hidden ones included, in
/// workbook order. Formula cells are skipped.
fn extract_text<R: Read + Seek>(
    package: &mut Package<R>,
    mut parts: Vec<String>,
    max_chars: usize,
) -> Result<String> {
    let shared = package
        .with_xml("xl/sharedStrings.xml", read_shared_strings)?
        .unwrap_or_default();

    if parts.is_empty() {
        parts = package.parts_matching("xl/worksheets/sheet", ".xml");
        sort_by_part_number(&mut parts);
    }

    let mut collector = TextCollector::new(max_chars);
    for part in parts {
        let more = package
            .with_xml(&part, |reader| collect_cell_text(reader, &shared, &mut collector))?
            .unwrap_or(true);
        if !more {
            break;
        }
    }
    Ok(collector.finish())
}

fn read_shared_strings(reader: &mut XmlReader<'_>) -> Result<Vec<String>> {
    let mut strings = Vec::new();
    let mut item: Option<String> = None;
    let mut in_text = false;
    let mut in_phonetic = false;

    walk(reader, |event| {
        match event {
            Event::Start(e) => match element_name(e) {
                "si" => item = Some(String::new()),
                "t" => in_text = true,
                "rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(e) if element_name(e) == "si" => strings.push(String::new()),
            Event::End(e) => match end_name(e) {
                "si" => strings.push(item.take().unwrap_or_default()),
                "t" => in_text = false,
                "rPh" => in_phonetic = false,
                _ => {}
            },
            other => {
                if in_text
                    && !in_phonetic
                    && let (Some(chunk), Some(text)) = (event_text(other)?, item.as_mut())
                {
                    text.push_str(&chunk);
                }
            }
        }
        Ok(Flow::Continue)
    })?;
    Ok(strings)
}

#[derive(Default)]
struct CellText {
    kind: String,
    has_formula: bool,
    value: String,
    inline: String,
}

/// Push the text of each string cell; returns `false` once the budget is spent.
fn collect_cell_text(
    reader: &mut XmlReader<'_>,
    shared: &[String],
    collector: &mut TextCollector,
) -> Result<bool> {
    let mut cell: Option<CellText> = None;
    let mut in_value = false;
    let mut in_inline_text = false;
    let mut more = true;

    walk(reader, |event| {
        match event {
            Event::Start(e) => match element_name(e) {
                "c" => {
                    cell = Some(CellText {
                        kind: attribute(e, "t")?.unwrap_or_default(),
                        ..CellText::default()
                    })
                }
                "f" => {
                    if let Some(c) = cell.as_mut() {
                        c.has_formula = true;
                    }
                }
                "v" => in_value = true,
                "t" => in_inline_text = true,
                _ => {}
            },
            Event::Empty(e) if element_name(e) == "f" => {
                if let Some(c) = cell.as_mut() {
                    c.has_formula = true;
                }
            }
            Event::End(e) => match end_name(e) {
                "c" => {
                    if let Some(done) = cell.take()
                        && let Some(line) = cell_string(&done, shared)
                        && !collector.push_line(line)
                    {
                        more = false;
                        return Ok(Flow::Stop);
                    }
                }
                "v" => in_value = false,
                "t" => in_inline_text = false,
                _ => {}
            },
            other => {
                if let (Some(chunk), Some(c)) = (event_text(other)?, cell.as_mut()) {
                    if in_value {
                        c.value.push_str(&chunk);
                    } else if in_inline_text {
                        c.inline.push_str(&chunk);
                    }
                }
            }
        }
        Ok(Flow::Continue)
    })?;
    Ok(more)
}

fn cell_string<'a>(cell: &'a CellText, shared: &'a [String]) -> Option<&'a str> {
    if cell.has_formula {
        return None;
    }
    let text = match cell.kind.as_str() {
        "s" => shared.get(cell.value.trim().parse::<usize>().ok()?)?.as_str(),
        "inlineStr" => cell.inline.as_str(),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}
