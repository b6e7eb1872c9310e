// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Docsweep.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Docsweep operations.
#[derive(Debug, Error)]
pub enum DocsweepError {
    // -- Discovery / preconditions --
    #[error("scan root does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    // -- Document errors --
    #[error("archive error: {0}")]
    Archive(String),

    #[error("XML parse error: {0}")]
    Xml(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    // -- Rules --
    #[error("check failed unexpectedly: {0}")]
    Check(String),

    // -- Configuration / output --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("CSV export failed: {0}")]
    Csv(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DocsweepError {
    /// Stable name of the variant, recorded as the `exception` detail when a
    /// failure is downgraded into a synthetic check result.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RootNotFound(_) => "RootNotFound",
            Self::Archive(_) => "Archive",
            Self::Xml(_) => "Xml",
            Self::Pdf(_) => "Pdf",
            Self::Check(_) => "Check",
            Self::Config(_) => "Config",
            Self::Csv(_) => "Csv",
            Self::Io(_) => "Io",
            Self::Serialization(_) => "Serialization",
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocsweepError>;
