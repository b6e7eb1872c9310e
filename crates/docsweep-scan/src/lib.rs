// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docsweep-scan — File discovery, the scan orchestrator and report
// aggregator, and the JSON/CSV exporters.

pub mod discovery;
pub mod export;
pub mod orchestrator;

pub use discovery::{DiscoveryOptions, discover_files};
pub use export::{ChecksCsvWriter, FilesCsvWriter, JsonReportWriter, ReportWriter};
pub use orchestrator::{
    ARTIFACT_BUILD_FAILED, NO_PROCESSOR, Orchestrator, ProcessorConflict, ProcessorIndex,
    ProgressObserver, ScanOptions,
};
