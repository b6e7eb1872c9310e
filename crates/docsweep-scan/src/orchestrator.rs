// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan orchestration: route each file to its processor, run every applicable
// check against the artifact, and aggregate the results into a report.
//
// Nothing that happens to a single file or a single rule aborts the run.
// Processor errors, check errors and panics in either are converted into
// attributed ERROR results; a file with no processor gets a WARNING.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use docsweep_core::error::Result;
use docsweep_core::{
    Check, CheckResult, FileArtifact, FileReport, Processor, Registry, ScanReport, Severity,
    extension_of, normalize_extension,
};
use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::discovery::{DiscoveryOptions, discover_files};

/// Name of the synthetic result for files no processor handles.
pub const NO_PROCESSOR: &str = "No processor found";
/// Name of the synthetic result for a processor that failed.
pub const ARTIFACT_BUILD_FAILED: &str = "Artifact build failed";

/// Receives one notification per processed file.
///
/// `index` is 1-based and strictly increasing across calls, also when files
/// are processed in parallel.
pub trait ProgressObserver: Send + Sync {
    fn on_file(&self, index: usize, total: usize, path: &Path);
}

impl<F> ProgressObserver for F
where
    F: Fn(usize, usize, &Path) + Send + Sync,
{
    fn on_file(&self, index: usize, total: usize, path: &Path) {
        self(index, total, path)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Process files on the rayon thread pool.
    pub parallel: bool,
}

/// Two processors claimed the same extension; the later registration won.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConflict {
    pub extension: String,
    pub replaced: String,
    pub winner: String,
}

/// Extension to processor routing table.
#[derive(Clone, Default)]
pub struct ProcessorIndex {
    by_extension: HashMap<String, Arc<dyn Processor>>,
    conflicts: Vec<ProcessorConflict>,
}

impl ProcessorIndex {
    /// Index processors in registration order. A later processor claiming
    /// an extension replaces the earlier one and the conflict is recorded.
    pub fn build(processors: &[Arc<dyn Processor>]) -> Self {
        let mut index = Self::default();
        for processor in processors {
            for ext in processor.supports() {
                let ext = normalize_extension(&ext);
                if ext.is_empty() {
                    continue;
                }
                if let Some(previous) = index.by_extension.insert(ext.clone(), Arc::clone(processor))
                {
                    warn!(
                        extension = %ext,
                        replaced = previous.name(),
                        winner = processor.name(),
                        "two processors claim the same extension; keeping the later one"
                    );
                    index.conflicts.push(ProcessorConflict {
                        extension: ext,
                        replaced: previous.name().to_owned(),
                        winner: processor.name().to_owned(),
                    });
                }
            }
        }
        index
    }

    pub fn get(&self, extension: &str) -> Option<&Arc<dyn Processor>> {
        self.by_extension.get(extension)
    }

    pub fn conflicts(&self) -> &[ProcessorConflict] {
        &self.conflicts
    }

    /// Indexed extensions, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

/// Everything produced for one file before aggregation.
struct FileOutcome {
    path: PathBuf,
    extension: String,
    size_bytes: u64,
    results: Vec<CheckResult>,
}

/// Drives a scan over a registry snapshot taken at construction.
pub struct Orchestrator {
    index: ProcessorIndex,
    checks: Vec<Arc<dyn Check>>,
    discovery: DiscoveryOptions,
    options: ScanOptions,
    progress: Option<Box<dyn ProgressObserver>>,
}

impl Orchestrator {
    pub fn new(registry: &Registry) -> Self {
        Self {
            index: ProcessorIndex::build(&registry.processors()),
            checks: registry.checks(),
            discovery: DiscoveryOptions::default(),
            options: ScanOptions::default(),
            progress: None,
        }
    }

    pub fn with_discovery(mut self, discovery: DiscoveryOptions) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.progress = Some(Box::new(observer));
        self
    }

    pub fn processor_index(&self) -> &ProcessorIndex {
        &self.index
    }

    /// Discover files under `root` and scan them.
    ///
    /// Only a missing root is an error; everything after discovery is
    /// reported inside the returned `ScanReport`.
    #[instrument(skip(self, config_snapshot), fields(root = %root.display()))]
    pub fn run_scan(&self, root: &Path, config_snapshot: Value) -> Result<ScanReport> {
        let files = discover_files(root, &self.discovery)?;
        Ok(self.run_files(root, &files, config_snapshot))
    }

    /// Scan an explicit list of files, in order.
    pub fn run_files(&self, root: &Path, files: &[PathBuf], config_snapshot: Value) -> ScanReport {
        let started = Utc::now();
        info!(
            files = files.len(),
            checks = self.checks.len(),
            parallel = self.options.parallel,
            "scan started"
        );

        let total = files.len();
        let counter = Mutex::new(0usize);
        let process = |path: &PathBuf| {
            let outcome = self.process_file(path);
            self.notify(&counter, total, path);
            outcome
        };
        let outcomes: Vec<FileOutcome> = if self.options.parallel {
            files.par_iter().map(process).collect()
        } else {
            files.iter().map(process).collect()
        };

        let reports = aggregate(outcomes);
        let root = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
        let report = ScanReport::assemble(root, started, Utc::now(), config_snapshot, reports);

        let totals = report.header().totals();
        info!(
            files = totals.files,
            checks = totals.checks,
            errors = totals.errors,
            warnings = totals.warnings,
            "scan finished"
        );
        report
    }

    fn notify(&self, counter: &Mutex<usize>, total: usize, path: &Path) {
        let Some(observer) = &self.progress else {
            return;
        };
        // The lock is held through the callback so indices arrive in order.
        let mut done = match counter.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *done += 1;
        observer.on_file(*done, total, path);
    }

    fn process_file(&self, path: &Path) -> FileOutcome {
        let extension = extension_of(path);
        let size_on_disk = || std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);

        let Some(processor) = self.index.get(&extension) else {
            debug!(path = %path.display(), extension = %extension, "no processor for file");
            let result = CheckResult::new(
                path,
                NO_PROCESSOR,
                Severity::Warning,
                false,
                format!("No processor registered for extension '{extension}'"),
            )
            .with_extra("extension", extension.as_str());
            return FileOutcome {
                path: path.to_path_buf(),
                size_bytes: size_on_disk(),
                extension,
                results: vec![result],
            };
        };

        let artifact = match guarded(|| processor.build_artifact(path)) {
            Ok(artifact) => artifact,
            Err(failure) => {
                error!(
                    path = %path.display(),
                    processor = processor.name(),
                    exception = failure.exception,
                    detail = %failure.detail,
                    "artifact build failed"
                );
                let result = CheckResult::new(
                    path,
                    ARTIFACT_BUILD_FAILED,
                    Severity::Error,
                    false,
                    format!("{} failed: {}", processor.name(), failure.detail),
                )
                .with_extra("exception", failure.exception)
                .with_extra("detail", failure.detail)
                .with_extra("processor", processor.name());
                return FileOutcome {
                    path: path.to_path_buf(),
                    size_bytes: size_on_disk(),
                    extension,
                    results: vec![result],
                };
            }
        };

        let results = self.run_checks(&artifact);
        FileOutcome {
            path: path.to_path_buf(),
            extension: artifact.extension().to_owned(),
            size_bytes: artifact.size_bytes(),
            results,
        }
    }

    fn run_checks(&self, artifact: &FileArtifact) -> Vec<CheckResult> {
        self.checks
            .iter()
            .filter(|check| check.targets(artifact.extension()))
            .map(|check| match guarded(|| check.run(artifact)) {
                Ok(result) => {
                    debug!(
                        check = check.name(),
                        severity = %result.severity,
                        passed = result.passed,
                        "check evaluated"
                    );
                    result
                }
                Err(failure) => {
                    error!(
                        path = %artifact.path().display(),
                        check = check.name(),
                        exception = failure.exception,
                        detail = %failure.detail,
                        "check raised"
                    );
                    CheckResult::new(
                        artifact.path(),
                        check.name(),
                        Severity::Error,
                        false,
                        format!("Check raised {}: {}", failure.exception, failure.detail),
                    )
                    .with_extra("exception", failure.exception)
                    .with_extra("detail", failure.detail)
                }
            })
            .collect()
    }
}

/// A processor or check call that returned `Err` or panicked.
struct Failure {
    exception: &'static str,
    detail: String,
}

fn guarded<T>(call: impl FnOnce() -> Result<T>) -> std::result::Result<T, Failure> {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(Failure {
            exception: err.kind(),
            detail: err.to_string(),
        }),
        Err(payload) => Err(Failure {
            exception: "panic",
            detail: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Group outcomes by path and derive one `FileReport` per file.
fn aggregate(outcomes: Vec<FileOutcome>) -> Vec<FileReport> {
    let mut grouped: BTreeMap<PathBuf, FileOutcome> = BTreeMap::new();
    for outcome in outcomes {
        match grouped.get_mut(&outcome.path) {
            Some(existing) => existing.results.extend(outcome.results),
            None => {
                grouped.insert(outcome.path.clone(), outcome);
            }
        }
    }
    grouped
        .into_values()
        .map(|o| FileReport::from_results(o.path, o.extension, o.size_bytes, o.results))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docsweep_core::{DocsweepError, Facts};

    struct Named(&'static str, &'static [&'static str]);

    impl Processor for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn supports(&self) -> Vec<String> {
            self.1.iter().map(|s| (*s).to_owned()).collect()
        }

        fn build_artifact(&self, path: &Path) -> Result<FileArtifact> {
            Ok(FileArtifact::new(path, ".txt", 0, Facts::Other(Default::default())))
        }
    }

    struct Other(&'static str, &'static [&'static str]);

    impl Processor for Other {
        fn name(&self) -> &str {
            self.0
        }

        fn supports(&self) -> Vec<String> {
            self.1.iter().map(|s| (*s).to_owned()).collect()
        }

        fn build_artifact(&self, _path: &Path) -> Result<FileArtifact> {
            Err(DocsweepError::Archive("nope".into()))
        }
    }

    #[test]
    fn later_processor_wins_and_conflict_is_recorded() {
        let processors: Vec<Arc<dyn Processor>> = vec![
            Arc::new(Named("first", &[".txt", "MD"])),
            Arc::new(Other("second", &["TXT"])),
        ];
        let index = ProcessorIndex::build(&processors);

        assert_eq!(index.get(".txt").map(|p| p.name()), Some("second"));
        assert_eq!(index.get(".md").map(|p| p.name()), Some("first"));
        assert_eq!(
            index.conflicts(),
            &[ProcessorConflict {
                extension: ".txt".into(),
                replaced: "first".into(),
                winner: "second".into(),
            }]
        );
        assert_eq!(index.extensions(), vec![".md", ".txt"]);
    }

    #[test]
    fn guarded_converts_errors_and_panics() {
        let failure = guarded::<()>(|| Err(DocsweepError::Xml("bad".into()))).err().unwrap();
        assert_eq!(failure.exception, "Xml");

        let failure = guarded::<()>(|| panic!("kaboom")).err().unwrap();
        assert_eq!(failure.exception, "panic");
        assert_eq!(failure.detail, "kaboom");
    }
}
