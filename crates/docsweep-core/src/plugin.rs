// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plugin contracts: processors extract facts, checks evaluate policy.
//
// Both sides are routed purely by file extension. The orchestrator depends
// only on these traits, never on a concrete processor or rule.

use std::path::Path;

use crate::error::Result;
use crate::types::{CheckResult, FileArtifact};

/// `applies_to` entry meaning "every extension".
pub const WILDCARD: &str = "*";

/// Extracts a read-only `FileArtifact` from a file.
pub trait Processor: Send + Sync + 'static {
    /// Human-readable name for diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Extensions handled, dot-prefixed (e.g. `[".xlsx"]`).
    fn supports(&self) -> Vec<String>;

    /// Build the artifact. Must never write to the filesystem.
    ///
    /// Returns `Err` only when the file cannot be opened at all; failures in
    /// optional extraction steps are recorded inside the facts instead.
    fn build_artifact(&self, path: &Path) -> Result<FileArtifact>;
}

/// A single read-only rule evaluated against one artifact.
pub trait Check: Send + Sync + 'static {
    /// Stable name used in reports and exports.
    fn name(&self) -> &str;

    /// Extensions this rule targets; `"*"` targets all.
    fn applies_to(&self) -> Vec<String>;

    /// Evaluate the rule.
    ///
    /// A rule failure is `Ok` with `passed == false`. `Err` signals a defect
    /// in the rule itself and is converted into a synthetic ERROR result by
    /// the orchestrator.
    fn run(&self, artifact: &FileArtifact) -> Result<CheckResult>;

    /// Whether the rule targets `extension` (already normalised).
    fn targets(&self, extension: &str) -> bool {
        self.applies_to().iter().any(|t| {
            let t = t.trim();
            t == WILDCARD || normalize_extension(t) == extension
        })
    }
}

/// Lowercase and dot-prefix an extension: `"XLSX"` and `".Xlsx"` both
/// become `".xlsx"`. Empty input stays empty.
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim().to_lowercase();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{trimmed}")
    }
}

/// Normalised extension of `path`, or an empty string when it has none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| normalize_extension(&e.to_string_lossy()))
        .unwrap_or_default()
}
