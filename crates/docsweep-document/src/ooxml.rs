// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// OOXML package access — ZIP part lookup, streaming XML events via
// `quick-xml`, a small element tree for parts that are read whole, and the
// OPC core-properties part shared by every Office family.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use docsweep_core::CoreProperties;
use docsweep_core::error::{DocsweepError, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use tracing::{debug, instrument};
use zip::ZipArchive;

/// Event reader over one package part.
pub type XmlReader<'a> = Reader<&'a mut dyn BufRead>;

/// Whether a streaming visitor wants more events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// A read-only OOXML container (`.xlsx`, `.docx`, `.pptx`).
pub struct Package<R = File> {
    archive: ZipArchive<R>,
    names: BTreeSet<String>,
    label: String,
}

impl Package<File> {
    /// Open a package from the filesystem.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file, path.display().to_string())
    }
}

impl<R: Read + Seek> Package<R> {
    /// Wrap any seekable byte source. `label` is used in error messages.
    pub fn from_reader(reader: R, label: impl Into<String>) -> Result<Self> {
        let label = label.into();
        let archive = ZipArchive::new(reader)
            .map_err(|err| DocsweepError::Archive(format!("{label}: {err}")))?;
        let names: BTreeSet<String> = archive.file_names().map(str::to_owned).collect();
        debug!(parts = names.len(), "package opened");
        Ok(Self {
            archive,
            names,
            label,
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// All part names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Part names with the given prefix and suffix, sorted.
    pub fn parts_matching(&self, prefix: &str, suffix: &str) -> Vec<String> {
        self.names
            .iter()
            .filter(|n| n.starts_with(prefix) && n.ends_with(suffix))
            .cloned()
            .collect()
    }

    /// Run `read` over the XML events of `name`. Absent parts yield `None`.
    pub fn with_xml<T, F>(&mut self, name: &str, read: F) -> Result<Option<T>>
    where
        F: FnOnce(&mut XmlReader<'_>) -> Result<T>,
    {
        if !self.contains(name) {
            return Ok(None);
        }
        let label = &self.label;
        let entry = self
            .archive
            .by_name(name)
            .map_err(|err| DocsweepError::Archive(format!("{label}: {name}: {err}")))?;
        let mut buffered = BufReader::new(entry);
        // Whitespace is significant inside text runs, so it is not trimmed.
        let mut reader: XmlReader<'_> = Reader::from_reader(&mut buffered as &mut dyn BufRead);

        read(&mut reader).map(Some).map_err(|err| match err {
            DocsweepError::Xml(msg) => DocsweepError::Xml(format!("{name}: {msg}")),
            other => other,
        })
    }

    /// Parse a whole part into an element tree.
    pub fn parse_part(&mut self, name: &str) -> Result<Option<XmlNode>> {
        self.with_xml(name, parse_tree)
    }

    /// Count elements in `name` whose local name is one of `locals`.
    pub fn count_elements(&mut self, name: &str, locals: &[&str]) -> Result<usize> {
        let counted = self.with_xml(name, |reader| {
            let mut count = 0;
            walk(reader, |event| {
                if let Event::Start(e) | Event::Empty(e) = event
                    && locals.contains(&element_name(e))
                {
                    count += 1;
                }
                Ok(Flow::Continue)
            })?;
            Ok(count)
        })?;
        Ok(counted.unwrap_or(0))
    }

    /// `docProps/core.xml`, or empty properties when the part is absent.
    pub fn core_properties(&mut self) -> Result<CoreProperties> {
        let Some(root) = self.parse_part("docProps/core.xml")? else {
            return Ok(CoreProperties::default());
        };
        let field = |name: &str| {
            root.find(name)
                .map(|n| n.text_content().trim().to_owned())
                .filter(|s| !s.is_empty())
        };
        Ok(CoreProperties {
            author: field("creator").or_else(|| field("lastModifiedBy")),
            created: field("created").as_deref().and_then(parse_w3c_datetime),
            modified: field("modified").as_deref().and_then(parse_w3c_datetime),
        })
    }
}

/// Feed every event of the part to `visit` until EOF or `Flow::Stop`.
pub fn walk<F>(reader: &mut XmlReader<'_>, mut visit: F) -> Result<()>
where
    F: FnMut(&Event<'_>) -> Result<Flow>,
{
    let mut buf = Vec::new();
    loop {
        let event = reader.read_event_into(&mut buf).map_err(xml_error)?;
        if matches!(event, Event::Eof) {
            break;
        }
        if visit(&event)? == Flow::Stop {
            break;
        }
        buf.clear();
    }
    Ok(())
}

/// Local (namespace-free) name of a start or empty tag.
pub fn element_name<'a>(e: &'a BytesStart<'_>) -> &'a str {
    std::str::from_utf8(e.local_name().into_inner()).unwrap_or("")
}

/// Local name of an end tag.
pub fn end_name<'a>(e: &'a BytesEnd<'_>) -> &'a str {
    std::str::from_utf8(e.local_name().into_inner()).unwrap_or("")
}

/// Attributes of a tag as `(local name, unescaped value)`, namespace
/// declarations excluded.
pub fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.as_ref().starts_with(b"xmlns") {
            continue;
        }
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value().map_err(xml_error)?.into_owned();
        out.push((key, value));
    }
    Ok(out)
}

/// Sort part names by their trailing number, so `slide2.xml` precedes
/// `slide10.xml`. Names without a number keep lexical order after numbered ones.
pub fn sort_by_part_number(parts: &mut [String]) {
    parts.sort_by_cached_key(|name| (part_number(name).unwrap_or(u32::MAX), name.clone()));
}

fn part_number(name: &str) -> Option<u32> {
    let stem = name.rsplit('/').next()?.split('.').next()?;
    let digits: String = stem
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok()
}

/// One attribute by local name.
pub fn attribute(e: &BytesStart<'_>, key: &str) -> Result<Option<String>> {
    Ok(attributes(e)?
        .into_iter()
        .find_map(|(k, v)| (k == key).then_some(v)))
}

/// Unescaped character data of a text or CDATA event.
pub fn event_text(event: &Event<'_>) -> Result<Option<String>> {
    match event {
        Event::Text(t) => Ok(Some(t.unescape().map_err(xml_error)?.into_owned())),
        Event::CData(c) => Ok(Some(String::from_utf8_lossy(c.as_ref()).into_owned())),
        _ => Ok(None),
    }
}

pub(crate) fn xml_error(err: impl std::fmt::Display) -> DocsweepError {
    DocsweepError::Xml(err.to_string())
}

// ---------------------------------------------------------------------------
// Element tree
// ---------------------------------------------------------------------------

/// An XML element with local names only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Character data directly inside this element.
    pub text: String,
}

impl XmlNode {
    fn from_start(e: &BytesStart<'_>) -> Result<Self> {
        Ok(Self {
            name: element_name(e).to_owned(),
            attrs: attributes(e)?,
            ..Self::default()
        })
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v.as_str()))
    }

    /// First direct child named `name`.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First element named `name` in document order, `self` included.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Every element named `name` in document order, `self` included.
    pub fn descendants<'a>(&'a self, name: &str) -> Vec<&'a XmlNode> {
        let mut out = Vec::new();
        self.collect(name, &mut out);
        out
    }

    fn collect<'a>(&'a self, name: &str, out: &mut Vec<&'a XmlNode>) {
        if self.name == name {
            out.push(self);
        }
        for child in &self.children {
            child.collect(name, out);
        }
    }

    /// Concatenated character data of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }
}

/// Read a whole part into a tree and return its root element.
pub fn parse_tree(reader: &mut XmlReader<'_>) -> Result<XmlNode> {
    // Synthetic document node at the bottom of the stack.
    let mut stack = vec![XmlNode::default()];
    walk(reader, |event| {
        match event {
            Event::Start(e) => stack.push(XmlNode::from_start(e)?),
            Event::Empty(e) => attach(&mut stack, XmlNode::from_start(e)?)?,
            Event::End(_) => {
                let node = match stack.pop() {
                    Some(node) if !stack.is_empty() => node,
                    _ => return Err(DocsweepError::Xml("unbalanced end tag".into())),
                };
                attach(&mut stack, node)?;
            }
            other => {
                if let (Some(text), Some(top)) = (event_text(other)?, stack.last_mut()) {
                    top.text.push_str(&text);
                }
            }
        }
        Ok(Flow::Continue)
    })?;

    let document = match stack.pop() {
        Some(document) if stack.is_empty() => document,
        _ => return Err(DocsweepError::Xml("unexpected end of document".into())),
    };
    document
        .children
        .into_iter()
        .next()
        .ok_or_else(|| DocsweepError::Xml("document has no root element".into()))
}

fn attach(stack: &mut [XmlNode], node: XmlNode) -> Result<()> {
    let parent = stack
        .last_mut()
        .ok_or_else(|| DocsweepError::Xml("element outside document".into()))?;
    parent.children.push(node);
    Ok(())
}

/// Parse a W3CDTF timestamp as found in `docProps/core.xml`.
pub fn parse_w3c_datetime(value: &str) -> Option<DateTime<Utc>> {
    let s = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}
