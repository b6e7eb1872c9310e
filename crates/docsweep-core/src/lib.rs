// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Docsweep — Core types, fact bags, errors, configuration, and the plugin
// registry shared across all crates.

pub mod config;
pub mod error;
pub mod facts;
pub mod plugin;
pub mod registry;
pub mod types;

pub use config::ScanConfig;
pub use error::DocsweepError;
pub use facts::*;
pub use plugin::{Check, Processor, WILDCARD, extension_of, normalize_extension};
pub use registry::Registry;
pub use types::*;
