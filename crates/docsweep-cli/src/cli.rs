// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "docsweep",
    version,
    about = "Read-only compliance scanner for office documents",
    long_about = "Scan a directory tree of XLSX, DOCX, PPTX and PDF files against a fixed \
                  catalogue of compliance rules and export a file-centric report.\n\n\
                  Configuration precedence: CLI flags > DOCSWEEP_* environment > --config file > defaults.",
    after_help = "Exit status: 0 when every file passes, 1 when any file fails, 2 when the scan could not run.",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan a directory tree and report per-file verdicts
    #[command(after_help = "Examples:\n  docsweep scan ./shared --json report.json\n  \
                            docsweep scan ./shared --cutoff 2025-06-30 --checks-csv checks.csv")]
    Scan(ScanArgs),
    /// List classic-yellow cells (or sheet tabs) in one workbook
    #[command(after_help = "Examples:\n  docsweep yellow budget.xlsx\n  docsweep yellow budget.xlsx --tabs --model")]
    Yellow(YellowArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    pub root: PathBuf,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the JSON report here
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Write the one-row-per-file CSV here
    #[arg(long, value_name = "FILE")]
    pub files_csv: Option<PathBuf>,

    /// Write the one-row-per-result CSV here
    #[arg(long, value_name = "FILE")]
    pub checks_csv: Option<PathBuf>,

    /// Fail files modified after this instant (RFC 3339, or YYYY-MM-DD for end of day UTC)
    #[arg(long, value_name = "DATE")]
    pub cutoff: Option<String>,

    /// Extra words accepted by the spelling rule, one per line
    #[arg(long, value_name = "FILE")]
    pub dictionary: Option<PathBuf>,

    /// Process files on a thread pool
    #[arg(long)]
    pub parallel: bool,

    /// Suppress progress and the console summary
    #[arg(long, short)]
    pub quiet: bool,
}

#[derive(Debug, Args)]
pub struct YellowArgs {
    /// Workbook to inspect
    pub file: PathBuf,

    /// List sheets with a yellow tab instead of cells
    #[arg(long)]
    pub tabs: bool,

    /// Load the whole workbook model instead of streaming each part
    #[arg(long)]
    pub model: bool,
}
