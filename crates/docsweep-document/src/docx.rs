// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `.docx` processor — comments, tracked changes, highlights and a text
// sample from a WordprocessingML package.

use std::io::{Read, Seek};
use std::path::Path;

use docsweep_core::error::Result;
use docsweep_core::{DocxFacts, Facts, FileArtifact, Processor, ScanConfig};
use quick_xml::events::Event;
use tracing::{debug, instrument};

use crate::ooxml::{Flow, Package, XmlNode, XmlReader, attributes, element_name, walk};
use crate::record_failure;
use crate::text::{self, TextCollector};

const DOCUMENT_PART: &str = "word/document.xml";

/// Revision-mark elements, counted wherever they appear.
const TRACKED_CHANGE_TAGS: [&str; 9] = [
    "ins",
    "del",
    "moveFrom",
    "moveTo",
    "tblPrChange",
    "trPrChange",
    "tcPrChange",
    "pPrChange",
    "rPrChange",
];

pub struct DocxProcessor {
    max_text_chars: usize,
    extract_text: bool,
}

impl DocxProcessor {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            max_text_chars: config.max_text_chars,
            extract_text: config.enable_spelling,
        }
    }

    fn inspect(&self, path: &Path) -> DocxFacts {
        let mut facts = DocxFacts::default();

        let mut package = match Package::open(path) {
            Ok(package) => package,
            Err(err) => {
                record_failure(&mut facts.read_error, "package", &err);
                if self.extract_text {
                    facts.text = text::failed_sample(&err);
                }
                return facts;
            }
        };

        match package.core_properties() {
            Ok(core) => facts.core = core,
            Err(err) => record_failure(&mut facts.read_error, "core-properties", &err),
        }

        let body = match package.parse_part(DOCUMENT_PART) {
            Ok(document) => document.as_ref().and_then(|d| d.child("body")).cloned(),
            Err(err) => {
                record_failure(&mut facts.read_error, "document", &err);
                None
            }
        };
        if let Some(body) = &body {
            facts.paragraph_count = Some(body.children_named("p").count());
            facts.table_count = Some(body.children_named("tbl").count());
        }

        if let Err(err) = scan_markup(&mut package, &mut facts) {
            record_failure(&mut facts.read_error, "zip-scan", &err);
        }

        if self.extract_text {
            facts.text = match &body {
                Some(body) => text::sample(body_text(body, self.max_text_chars)),
                None => text::sample(String::new()),
            };
        }

        facts
    }
}

impl Default for DocxProcessor {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl Processor for DocxProcessor {
    fn name(&self) -> &str {
        "DocxProcessor"
    }

    fn supports(&self) -> Vec<String> {
        vec![".docx".to_owned()]
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn build_artifact(&self, path: &Path) -> Result<FileArtifact> {
        let size_bytes = std::fs::metadata(path)?.len();
        let facts = self.inspect(path);
        debug!(
            comments = facts.comments_count,
            tracked_changes = facts.tracked_changes_count,
            highlights = facts.highlight_run_count + facts.shading_highlight_count,
            "docx facts extracted"
        );
        Ok(FileArtifact::new(path, ".docx", size_bytes, Facts::Docx(facts)))
    }
}

/// Main document plus every header and footer part.
fn story_parts<R: Read + Seek>(package: &Package<R>) -> Vec<String> {
    let mut parts = vec![DOCUMENT_PART.to_owned()];
    parts.extend(package.parts_matching("word/header", ".xml"));
    parts.extend(package.parts_matching("word/footer", ".xml"));
    parts
}

fn scan_markup<R: Read + Seek>(package: &mut Package<R>, facts: &mut DocxFacts) -> Result<()> {
    facts.comments_count = package.count_elements("word/comments.xml", &["comment"])?
        + package.count_elements("word/commentsExtended.xml", &["commentEx"])?;

    for part in story_parts(package) {
        facts.tracked_changes_count += package.count_elements(&part, &TRACKED_CHANGE_TAGS)?;
        if let Some((highlights, shading)) = package.with_xml(&part, count_highlights)? {
            facts.highlight_run_count += highlights;
            facts.shading_highlight_count += shading;
        }
    }
    Ok(())
}

/// `(<w:highlight> count, <w:shd> count with a real fill)`.
fn count_highlights(reader: &mut XmlReader<'_>) -> Result<(usize, usize)> {
    let mut highlights = 0;
    let mut shading = 0;
    walk(reader, |event| {
        if let Event::Start(e) | Event::Empty(e) = event {
            match element_name(e) {
                "highlight" => highlights += 1,
                "shd" => {
                    let filled = attributes(e)?
                        .iter()
                        .any(|(key, value)| key.ends_with("fill") && is_real_fill(value));
                    if filled {
                        shading += 1;
                    }
                }
                _ => {}
            }
        }
        Ok(Flow::Continue)
    })?;
    Ok((highlights, shading))
}

fn is_real_fill(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    !v.is_empty() && v != "auto" && v != "none"
}

/// Text of a paragraph: its `w:t` runs concatenated.
fn paragraph_text(p: &XmlNode) -> String {
    p.descendants("t")
        .into_iter()
        .map(|t| t.text.as_str())
        .collect()
}

/// Body paragraphs first, then the text of each table cell.
fn body_text(body: &XmlNode, max_chars: usize) -> String {
    let mut collector = TextCollector::new(max_chars);
    for p in body.children_named("p") {
        if !collector.push_line(&paragraph_text(p)) {
            return collector.finish();
        }
    }
    for table in body.children_named("tbl") {
        for row in table.children_named("tr") {
            for cell in row.children_named("tc") {
                let text = cell
                    .children_named("p")
                    .map(paragraph_text)
                    .collect::<Vec<_>>()
                    .join("\n");
                if !collector.push_line(&text) {
                    return collector.finish();
                }
            }
        }
    }
    collector.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, children: Vec<XmlNode>) -> XmlNode {
        XmlNode {
            name: name.to_owned(),
            children,
            ..XmlNode::default()
        }
    }

    fn text(value: &str) -> XmlNode {
        XmlNode {
            name: "t".to_owned(),
            text: value.to_owned(),
            ..XmlNode::default()
        }
    }

    #[test]
    fn fill_values_that_do_not_count() {
        assert!(!is_real_fill("auto"));
        assert!(!is_real_fill(" NONE "));
        assert!(!is_real_fill(""));
        assert!(is_real_fill("FFFF00"));
    }

    #[test]
    fn body_text_reads_paragraphs_then_cells() {
        let body = node(
            "body",
            vec![
                node("p", vec![node("r", vec![text("Hello ")]), node("r", vec![text("world")])]),
                node(
                    "tbl",
                    vec![node("tr", vec![node("tc", vec![node("p", vec![text("cell")])])])],
                ),
                node("p", vec![text("after")]),
            ],
        );
        let out = body_text(&body, 1_000);
        assert_eq!(out, "Hello world after cell");
    }
}
