// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `.pdf` processor — encryption, pages, annotations, modification date and
// a text sample.

use std::path::Path;

use docsweep_core::error::Result;
use docsweep_core::{Facts, FileArtifact, PdfFacts, Processor, ScanConfig};
use tracing::{debug, instrument};

use super::reader::PdfReader;
use crate::record_failure;
use crate::text::{self, TextCollector};

pub struct PdfProcessor {
    max_text_chars: usize,
    extract_text: bool,
}

impl PdfProcessor {
    pub fn new(config: &ScanConfig) -> Self {
        Self {
            max_text_chars: config.max_text_chars,
            extract_text: config.enable_spelling,
        }
    }

    fn inspect(&self, path: &Path) -> PdfFacts {
        let mut facts = PdfFacts::default();

        let reader = match PdfReader::open(path) {
            Ok(reader) => reader,
            Err(err) => {
                record_failure(&mut facts.read_error, "open", &err);
                if self.extract_text {
                    facts.text = text::failed_sample(&err);
                }
                return facts;
            }
        };

        facts.encrypted = reader.is_encrypted();
        // Encrypted documents keep only the flag; their page tree and info
        // dictionary are not trusted.
        if !facts.encrypted {
            facts.pages = Some(reader.page_count());
            facts.annots_summary = reader.annotation_summary();
            facts.mod_date = reader.modification_date();
        }

        if self.extract_text {
            let mut collector = TextCollector::new(self.max_text_chars);
            facts.text = match reader.extract_text(|page| collector.push_line(page)) {
                Ok(()) => text::sample(collector.finish()),
                Err(err) => text::failed_sample(&err),
            };
        }

        facts
    }
}

impl Default for PdfProcessor {
    fn default() -> Self {
        Self::new(&ScanConfig::default())
    }
}

impl Processor for PdfProcessor {
    fn name(&self) -> &str {
        "PdfProcessor"
    }

    fn supports(&self) -> Vec<String> {
        vec![".pdf".to_owned()]
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    fn build_artifact(&self, path: &Path) -> Result<FileArtifact> {
        let size_bytes = std::fs::metadata(path)?.len();
        let facts = self.inspect(path);
        debug!(
            pages = ?facts.pages,
            encrypted = facts.encrypted,
            annotations = facts.annots_summary.values().sum::<usize>(),
            "pdf facts extracted"
        );
        Ok(FileArtifact::new(path, ".pdf", size_bytes, Facts::Pdf(facts)))
    }
}
