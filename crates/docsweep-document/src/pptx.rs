// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `.pptx` processor — slides, shapes, speaker notes, comments and a text
// sample from a PresentationML package.

use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

use docsweep_core::error::Result;
use docsweep_core::{Facts, FileArtifact, PptxFacts, Processor, ScanConfig};
use tracing::{debug, instrument};

use crate::ooxml::{Package, XmlNode, sort_by_part_number};
use crate::record_failure;
use crate::text::{self, TextCollector};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS_PART: &str = "ppt/_rels/presentation.xml.rels";

/// Shape-tree children that describe the group itself rather than a shape.
const GROUP_PROPERTY_TAGS: [&str; 3] = ["nvGrpSpPr", "grpSpPr", "extLst"];

pub struct PptxProcessor {
    max_text_chars: usize,
    extract_text: bool,
}

impl PptxProcessor {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            max_text_chars: config.max_text_chars,
            extract_text: config.enable_spelling,
        }
    }

    fn inspect(&self, path: &Path) -> PptxFacts {
        let mut facts = PptxFacts::default();

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

        let slides = match load_slides(&mut package) {
            Ok(slides) => Some(slides),
            Err(err) => {
                record_failure(&mut facts.read_error, "slides", &err);
                None
            }
        };
        if let Some(slides) = &slides {
            facts.slide_count = Some(slides.len());
            facts.total_shapes = Some(slides.iter().map(|s| s.shape_count).sum());
            facts.has_any_notes = Some(slides.iter().any(|s| s.has_notes));
        }

        let mut comments = 0;
        for part in package.parts_matching("ppt/comments/comment", ".xml") {
            match package.count_elements(&part, &["cm"]) {
                Ok(n) => comments += n,
                Err(err) => record_failure(&mut facts.read_error, "comments", &err),
            }
        }
        facts.comments_count = comments;

        if self.extract_text {
            let mut collector = TextCollector::new(self.max_text_chars);
            for slide in slides.iter().flatten() {
                if !slide
                    .paragraphs
                    .iter()
                    .all(|line| collector.push_line(line))
                {
                    break;
                }
            }
            facts.text = text::sample(collector.finish());
        }

        facts
    }
}

impl Default for PptxProcessor {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl Processor for PptxProcessor {
    fn name(&self) -> &str {
        "PptxProcessor"
    }

    fn supports(&self) -> Vec<String> {
        vec![".pptx".to_owned()]
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn build_artifact(&self, path: &Path) -> Result<FileArtifact> {
        let size_bytes = std::fs::metadata(path)?.len();
        let facts = self.inspect(path);
        debug!(
            slides = ?facts.slide_count,
            comments = facts.comments_count,
            "pptx facts extracted"
        );
        Ok(FileArtifact::new(path, ".pptx", size_bytes, Facts::Pptx(facts)))
    }
}

/// What the processor keeps from one slide.
#[derive(Debug, Default)]
struct SlideSummary {
    shape_count: usize,
    has_notes: bool,
    /// Text of each `<a:p>`, in document order.
    paragraphs: Vec<String>,
}

/// Slides in presentation order.
fn load_slides<R: Read + Seek>(package: &mut Package<R>) -> Result<Vec<SlideSummary>> {
    let mut summaries = Vec::new();
    for part in slide_parts(package)? {
        let Some(root) = package.parse_part(&part)? else {
            continue;
        };
        let shape_count = root
            .find("spTree")
            .map(|tree| {
                tree.children
                    .iter()
                    .filter(|c| !GROUP_PROPERTY_TAGS.contains(&c.name.as_str()))
                    .count()
            })
            .unwrap_or(0);
        let paragraphs = root
            .descendants("p")
            .into_iter()
            .map(|p| {
                p.descendants("t")
                    .into_iter()
                    .map(|t| t.text.as_str())
                    .collect::<String>()
            })
            .collect();

        summaries.push(SlideSummary {
            shape_count,
            has_notes: has_notes_slide(package, &part)?,
            paragraphs,
        });
    }
    Ok(summaries)
}

/// Slide parts listed in `<p:sldIdLst>`, or every `ppt/slides/slideN.xml`
/// by number when the presentation part does not list them.
fn slide_parts<R: Read + Seek>(package: &mut Package<R>) -> Result<Vec<String>> {
    let targets: HashMap<String, String> = match package.parse_part(PRESENTATION_RELS_PART)? {
        Some(rels) => relationship_targets(&rels, "ppt"),
        None => HashMap::new(),
    };
    let listed: Vec<String> = match package.parse_part(PRESENTATION_PART)? {
        Some(presentation) => presentation
            .descendants("sldId")
            .into_iter()
            // `<p:sldId id="256" r:id="rId2"/>`: both attributes share a local
            // name, only the relationship id resolves.
            .filter_map(|entry| {
                entry
                    .attrs
                    .iter()
                    .filter(|(key, _)| key == "id")
                    .find_map(|(_, value)| targets.get(value))
                    .cloned()
            })
            .filter(|part| package.contains(part))
            .collect(),
        None => Vec::new(),
    };
    if !listed.is_empty() {
        return Ok(listed);
    }
    let mut parts = package.parts_matching("ppt/slides/slide", ".xml");
    sort_by_part_number(&mut parts);
    Ok(parts)
}

/// `Id -> part name` for a relationships part whose source lives in `base`.
fn relationship_targets(rels: &XmlNode, base: &str) -> HashMap<String, String> {
    rels.descendants("Relationship")
        .into_iter()
        .filter(|rel| rel.attr("TargetMode") != Some("External"))
        .filter_map(|rel| {
            let id = rel.attr("Id")?;
            let target = rel.attr("Target")?;
            Some((id.to_owned(), resolve_target(base, target)))
        })
        .collect()
}

/// Resolve a relationship target against the directory of its source part.
fn resolve_target(base: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_owned();
    }
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// A slide has notes when its relationships point at a notes slide.
fn has_notes_slide<R: Read + Seek>(package: &mut Package<R>, slide_part: &str) -> Result<bool> {
    let (dir, file) = slide_part.rsplit_once('/').unwrap_or(("", slide_part));
    let rels_part = format!("{dir}/_rels/{file}.rels");
    Ok(package.parse_part(&rels_part)?.is_some_and(|rels| {
        rels.descendants("Relationship")
            .iter()
            .any(|rel| rel.attr("Type").is_some_and(|t| t.ends_with("/notesSlide")))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_and_absolute_targets() {
        assert_eq!(resolve_target("ppt", "slides/slide1.xml"), "ppt/slides/slide1.xml");
        assert_eq!(
            resolve_target("ppt/slides", "../notesSlides/notesSlide1.xml"),
            "ppt/notesSlides/notesSlide1.xml"
        );
        assert_eq!(resolve_target("ppt", "/ppt/slides/slide9.xml"), "ppt/slides/slide9.xml");
    }

    #[test]
    fn external_relationships_are_not_parts() {
        let rel = |id: &str, target: &str, mode: Option<&str>| {
            let mut attrs = vec![
                ("Id".to_owned(), id.to_owned()),
                ("Target".to_owned(), target.to_owned()),
            ];
            if let Some(mode) = mode {
                attrs.push(("TargetMode".to_owned(), mode.to_owned()));
            }
            XmlNode {
                name: "Relationship".to_owned(),
                attrs,
                ..XmlNode::default()
            }
        };
        let rels = XmlNode {
            name: "Relationships".to_owned(),
            children: vec![
                rel("rId1", "slides/slide1.xml", None),
                rel("rId2", "https://example.com", Some("External")),
            ],
            ..XmlNode::default()
        };
        let targets = relationship_targets(&rels, "ppt");
        assert_eq!(targets.len(), 1);
        assert_eq!(targets["rId1"], "ppt/slides/slide1.xml");
    }
}
