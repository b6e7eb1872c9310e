// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Docsweep — read-only compliance scanner for office documents.
//
// Entry point. Resolves configuration, initialises logging, composes the
// registry, runs the scan and writes the requested reports.

mod bootstrap;
mod cli;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use docsweep_core::config::parse_cutoff;
use docsweep_core::error::Result;
use docsweep_core::{DocsweepError, FileVerdict, ScanConfig, ScanReport, Severity};
use docsweep_document::xlsx::{Strategy, locate_yellow_in_file};
use docsweep_scan::{
    ChecksCsvWriter, DiscoveryOptions, FilesCsvWriter, JsonReportWriter, Orchestrator,
    ReportWriter, ScanOptions,
};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, ScanArgs, YellowArgs};

/// Exit status when the scan could not run at all.
const EXIT_PRECONDITION: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Scan(args) => scan(&args),
        Command::Yellow(args) => yellow(&args),
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.to_lowercase()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// File, then environment, then flags.
fn resolve_config(args: &ScanArgs) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::load(path).map_err(|err| {
            DocsweepError::Config(format!("cannot load {}: {err}", path.display()))
        })?,
        None => ScanConfig::default(),
    };
    config.apply_env()?;
    if let Some(cutoff) = &args.cutoff {
        config.modified_cutoff = Some(parse_cutoff(cutoff)?);
    }
    if let Some(dictionary) = &args.dictionary {
        config.spelling_dictionary = Some(dictionary.clone());
    }
    if args.parallel {
        config.parallel = true;
    }
    if args.quiet && std::env::var_os("RUST_LOG").is_none() {
        config.log_level = "warn".to_owned();
    }
    Ok(config)
}

fn scan(args: &ScanArgs) -> ExitCode {
    let config = match resolve_config(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("docsweep: {err}");
            return ExitCode::from(EXIT_PRECONDITION);
        }
    };
    init_logging(&config.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "docsweep starting");

    let registry = bootstrap::build_registry(&config);
    let mut orchestrator = Orchestrator::new(&registry)
        .with_discovery(DiscoveryOptions::from_config(&config))
        .with_options(ScanOptions {
            parallel: config.parallel,
        });
    if !args.quiet {
        orchestrator =
            orchestrator.with_progress(|index: usize, total: usize, path: &Path| {
                eprintln!("[{index}/{total}] {}", path.display());
            });
    }

    let report = match orchestrator.run_scan(&args.root, config.snapshot()) {
        Ok(report) => report,
        Err(err) => {
            tracing::error!(error = %err, "scan could not start");
            eprintln!("docsweep: {err}");
            return ExitCode::from(EXIT_PRECONDITION);
        }
    };

    if let Err(err) = export(args, &report) {
        tracing::error!(error = %err, "report export failed");
        eprintln!("docsweep: {err}");
        return ExitCode::from(EXIT_PRECONDITION);
    }
    if !args.quiet {
        print_summary(&report);
    }

    if report.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn export(args: &ScanArgs, report: &ScanReport) -> Result<()> {
    let mut writers: Vec<Box<dyn ReportWriter>> = Vec::new();
    if let Some(path) = &args.json {
        writers.push(Box::new(JsonReportWriter::new(path)));
    }
    if let Some(path) = &args.files_csv {
        writers.push(Box::new(FilesCsvWriter::new(path)));
    }
    if let Some(path) = &args.checks_csv {
        writers.push(Box::new(ChecksCsvWriter::new(path)));
    }
    for writer in writers {
        writer.write(report)?;
    }
    Ok(())
}

fn print_summary(report: &ScanReport) {
    for file in report.files() {
        println!(
            "{:<4}  {}  (errors {}, warnings {}, infos {})",
            file.verdict().as_str(),
            file.file().display(),
            file.errors(),
            file.warnings(),
            file.infos()
        );
        for result in file
            .results()
            .iter()
            .filter(|r| !r.passed && r.severity >= Severity::Warning)
        {
            println!(
                "      {:<7} {}: {}",
                result.severity.as_str(),
                result.check_name,
                result.message
            );
        }
    }

    let totals = report.header().totals();
    let failed = report
        .files()
        .iter()
        .filter(|f| f.verdict() == FileVerdict::Fail)
        .count();
    println!(
        "\n{} file(s), {} result(s): {} error(s), {} warning(s), {} info(s); {} file(s) failed",
        totals.files, totals.checks, totals.errors, totals.warnings, totals.infos, failed
    );
}

fn yellow(args: &YellowArgs) -> ExitCode {
    init_logging("warn");
    let strategy = if args.model {
        Strategy::Model
    } else {
        Strategy::Streaming
    };

    let found = match locate_yellow_in_file(&args.file, strategy) {
        Ok(found) => found,
        Err(err) => {
            eprintln!("docsweep: {}: {err}", args.file.display());
            return ExitCode::from(EXIT_PRECONDITION);
        }
    };

    let listed: Vec<String> = if args.tabs {
        found.tabs
    } else {
        found
            .cells
            .iter()
            .map(|c| format!("{}!{}", c.sheet, c.cell))
            .collect()
    };
    for line in &listed {
        println!("{line}");
    }

    if listed.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
