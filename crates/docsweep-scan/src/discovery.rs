// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File discovery: walk a root directory, prune ignored directories, and keep
// files whose extension is on the allow-list.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use docsweep_core::error::{DocsweepError, Result};
use docsweep_core::{ScanConfig, extension_of, normalize_extension};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// What discovery keeps and what it prunes. Both sets are lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    extensions: HashSet<String>,
    ignore_dirs: HashSet<String>,
}

impl DiscoveryOptions {
    pub fn new<E, I>(extensions: E, ignore_dirs: I) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            extensions: extensions
                .into_iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
            ignore_dirs: ignore_dirs
                .into_iter()
                .map(|d| d.as_ref().trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(&config.target_extensions, &config.ignore_dirs)
    }

    pub fn accepts(&self, path: &Path) -> bool {
        self.extensions.contains(&extension_of(path))
    }

    fn is_ignored_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && self
                .ignore_dirs
                .contains(&entry.file_name().to_string_lossy().to_lowercase())
    }
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

/// Every matching file under `root`, in deterministic order (entries sorted
/// by name within each directory). Symlinks are not followed.
///
/// Unreadable entries are logged and skipped; only a missing root is an
/// error.
pub fn discover_files(root: &Path, options: &DiscoveryOptions) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(DocsweepError::RootNotFound(root.to_path_buf()));
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !options.is_ignored_dir(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && options.accepts(entry.path()) {
            files.push(entry.into_path());
        }
    }

    debug!(root = %root.display(), files = files.len(), "discovery finished");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn matches_extensions_case_insensitively_and_prunes_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "b.DOCX");
        touch(root, "a.pdf");
        touch(root, "notes.txt");
        touch(root, "sub/c.xlsx");
        touch(root, "Venv/skip.pdf");
        touch(root, ".git/objects/skip.docx");

        let found = discover_files(root, &DiscoveryOptions::default()).unwrap();
        let names: Vec<String> = found
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.DOCX", "sub/c.xlsx"]);
    }

    #[test]
    fn custom_allow_list() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "x.pdf");
        touch(dir.path(), "y.xlsx");

        let options = DiscoveryOptions::new(["XLSX"], Vec::<String>::new());
        let found = discover_files(dir.path(), &options).unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].ends_with("y.xlsx"));
    }

    #[test]
    fn missing_root_is_a_precondition_error() {
        let err = discover_files(Path::new("/no/such/docsweep/root"), &DiscoveryOptions::default())
            .unwrap_err();
        assert_eq!(err.kind(), "RootNotFound");
    }

    #[test]
    fn root_named_like_an_ignored_dir_is_still_walked() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("venv");
        touch(&root, "kept.pdf");

        let found = discover_files(&root, &DiscoveryOptions::default()).unwrap();
        assert_eq!(found.len(), 1);
    }
}
