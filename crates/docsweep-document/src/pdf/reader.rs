// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — open and inspect existing PDF documents using the `lopdf`
// crate: encryption, page tree, annotations, document info and text.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use docsweep_core::error::{DocsweepError, Result};
use lopdf::{Dictionary, Document, Object};
use tracing::{debug, instrument, warn};

/// Read-only view of a PDF file.
///
/// Wraps `lopdf::Document` and exposes the handful of facts the compliance
/// checks need.
pub struct PdfReader {
    document: Document,
}

impl PdfReader {
    /// Open a PDF from the filesystem.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_ref = path.as_ref();
        let document = Document::load(path_ref).map_err(|err| {
            DocsweepError::Pdf(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        debug!(
            pages = document.get_pages().len(),
            encrypted = document.is_encrypted(),
            "PDF loaded"
        );

        Ok(Self { document })
    }

    /// Whether the trailer carries an `/Encrypt` dictionary.
    pub fn is_encrypted(&self) -> bool {
        self.document.is_encrypted()
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.document.get_pages().len()
    }

    /// Annotation subtype (without the leading `/`) to count, over all pages.
    ///
    /// Malformed annotation entries are skipped.
    pub fn annotation_summary(&self) -> BTreeMap<String, usize> {
        let mut summary = BTreeMap::new();
        for (page_number, page_id) in self.document.get_pages() {
            let Ok(page) = self.document.get_dictionary(page_id) else {
                warn!(page_number, "page dictionary unreadable");
                continue;
            };
            let Some(annots) = page
                .get(b"Annots")
                .ok()
                .and_then(|obj| self.resolve(obj))
                .and_then(|obj| obj.as_array().ok())
            else {
                continue;
            };
            for annot in annots {
                let subtype = self
                    .resolve(annot)
                    .and_then(|obj| obj.as_dict().ok())
                    .and_then(|dict| dict.get(b"Subtype").ok())
                    .and_then(|obj| self.resolve(obj))
                    .and_then(|obj| obj.as_name().ok());
                if let Some(name) = subtype {
                    let name = String::from_utf8_lossy(name);
                    *summary
                        .entry(name.trim_start_matches('/').to_owned())
                        .or_insert(0) += 1;
                }
            }
        }
        summary
    }

    /// `/ModDate` (or `/ModificationDate`) from the document info dictionary.
    pub fn modification_date(&self) -> Option<DateTime<Utc>> {
        let info = self.info()?;
        [b"ModDate".as_slice(), b"ModificationDate".as_slice()]
            .iter()
            .find_map(|key| info.get(key).ok())
            .and_then(|obj| self.resolve(obj))
            .and_then(decode_text_string)
            .and_then(|raw| parse_pdf_date(&raw))
    }

    // -- Extraction -----------------------------------------------------------

    /// Extract text page by page, calling `push` with each page's text until
    /// it returns `false`. Pages whose content cannot be decoded are skipped.
    #[instrument(skip_all)]
    pub fn extract_text(&self, mut push: impl FnMut(&str) -> bool) -> Result<()> {
        if self.is_encrypted() {
            return Err(DocsweepError::Pdf(
                "encrypted PDF: cannot extract text".into(),
            ));
        }
        for page_number in self.document.get_pages().keys() {
            match self.document.extract_text(&[*page_number]) {
                Ok(text) => {
                    if !text.is_empty() && !push(&text) {
                        break;
                    }
                }
                Err(err) => debug!(page_number, error = %err, "page text skipped"),
            }
        }
        Ok(())
    }

    // -- Internals ------------------------------------------------------------

    fn resolve<'a>(&'a self, object: &'a Object) -> Option<&'a Object> {
        self.document.dereference(object).ok().map(|(_, obj)| obj)
    }

    fn info(&self) -> Option<&Dictionary> {
        let info = self.document.trailer.get(b"Info").ok()?;
        self.resolve(info)?.as_dict().ok()
    }
}

/// Decode a PDF text string: UTF-16BE with a byte-order mark, otherwise
/// bytes taken as Latin-1 compatible text.
fn decode_text_string(object: &Object) -> Option<String> {
    let Object::String(bytes, _) = object else {
        return None;
    };
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16(&units).ok();
    }
    Some(bytes.iter().map(|&b| char::from(b)).collect())
}

/// Parse a PDF date (`D:YYYYMMDDHHmmSSOHH'mm'`) into UTC.
///
/// Every component after the year is optional; missing fields default to
/// the start of their range and a missing offset means UTC.
pub fn parse_pdf_date(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    let s = s.strip_prefix("D:").unwrap_or(s);

    let digits_end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (digits, rest) = s.split_at(digits_end);
    if digits.len() < 4 {
        return None;
    }
    let field = |start: usize, len: usize, default: u32| -> Option<u32> {
        match digits.get(start..start + len) {
            Some(part) => part.parse().ok(),
            None => Some(default),
        }
    };

    let year: i32 = digits.get(0..4)?.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, field(4, 2, 1)?, field(6, 2, 1)?)?;
    let naive = date.and_hms_opt(field(8, 2, 0)?, field(10, 2, 0)?, field(12, 2, 0)?)?;

    let offset = parse_offset(rest)?;
    let local = offset.from_local_datetime(&naive).single()?;
    Some(local.with_timezone(&Utc))
}

/// `Z`, `+HH'mm'`, `-HHmm` or nothing.
fn parse_offset(rest: &str) -> Option<FixedOffset> {
    let utc = FixedOffset::east_opt(0);
    let mut chars = rest.chars();
    let sign = match chars.next() {
        None | Some('Z') => return utc,
        Some('+') => 1,
        Some('-') => -1,
        Some(_) => return utc,
    };
    let digits: String = chars.filter(char::is_ascii_digit).take(4).collect();
    let hours: i32 = digits.get(0..2).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minutes: i32 = digits.get(2..4).and_then(|m| m.parse().ok()).unwrap_or(0);
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_date_with_positive_offset() {
        let dt = parse_pdf_date("D:20240315103000+05'30'").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-03-15T05:00:00+00:00");
    }

    #[test]
    fn negative_offset_without_apostrophes() {
        let dt = parse_pdf_date("D:20231231230000-0800").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T07:00:00+00:00");
    }

    #[test]
    fn partial_dates_fill_defaults() {
        let dt = parse_pdf_date("D:2022").unwrap();
        assert_eq!(dt.to_rfc3339(), "2022-01-01T00:00:00+00:00");

        let dt = parse_pdf_date("20220704Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2022-07-04T00:00:00+00:00");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_pdf_date("").is_none());
        assert!(parse_pdf_date("D:yesterday").is_none());
        assert!(parse_pdf_date("D:20221399").is_none());
    }

    #[test]
    fn utf16_text_strings_decode() {
        let obj = Object::String(
            vec![0xFE, 0xFF, 0x00, b'D', 0x00, b':', 0x00, b'2'],
            lopdf::StringFormat::Literal,
        );
        assert_eq!(decode_text_string(&obj).as_deref(), Some("D:2"));
        assert!(decode_text_string(&Object::Null).is_none());
    }
}
