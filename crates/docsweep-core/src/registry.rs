// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Catalog of processor and check plugins.
//
// Populated by an explicit bootstrap step before any run starts, then only
// read. Registration is idempotent per concrete type.

use std::any::TypeId;
use std::sync::Arc;

use tracing::debug;

use crate::plugin::{Check, Processor};

/// Append-only catalog of plugins.
#[derive(Default, Clone)]
pub struct Registry {
    processors: Vec<(TypeId, Arc<dyn Processor>)>,
    checks: Vec<(TypeId, Arc<dyn Check>)>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `p` unless an instance of the same type is already registered.
    pub fn register_processor<P: Processor>(&mut self, p: P) -> &mut Self {
        let id = TypeId::of::<P>();
        if self.processors.iter().any(|(existing, _)| *existing == id) {
            debug!(processor = p.name(), "processor already registered, ignoring");
        } else {
            self.processors.push((id, Arc::new(p)));
        }
        self
    }

    /// Add `c` unless an instance of the same type is already registered.
    pub fn register_check<C: Check>(&mut self, c: C) -> &mut Self {
        let id = TypeId::of::<C>();
        if self.checks.iter().any(|(existing, _)| *existing == id) {
            debug!(check = c.name(), "check already registered, ignoring");
        } else {
            self.checks.push((id, Arc::new(c)));
        }
        self
    }

    /// Snapshot of registered processors in registration order.
    pub fn processors(&self) -> Vec<Arc<dyn Processor>> {
        self.processors.iter().map(|(_, p)| Arc::clone(p)).collect()
    }

    /// Snapshot of registered checks in registration order.
    pub fn checks(&self) -> Vec<Arc<dyn Check>> {
        self.checks.iter().map(|(_, c)| Arc::clone(c)).collect()
    }

    pub fn processor_count(&self) -> usize {
        self.processors.len()
    }

    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Drop every registration. Intended for tests.
    pub fn clear(&mut self) {
        self.processors.clear();
        self.checks.clear();
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field(
                "processors",
                &self.processors.iter().map(|(_, p)| p.name()).collect::<Vec<_>>(),
            )
            .field(
                "checks",
                &self.checks.iter().map(|(_, c)| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::facts::Facts;
    use crate::types::{CheckResult, FileArtifact};
    use std::collections::BTreeMap;
    use std::path::Path;

    struct TxtProcessor;

    impl Processor for TxtProcessor {
        fn supports(&self) -> Vec<String> {
            vec![".txt".into()]
        }

        fn build_artifact(&self, path: &Path) -> Result<FileArtifact> {
            Ok(FileArtifact::new(path, ".txt", 0, Facts::Other(BTreeMap::new())))
        }
    }

    struct Named(&'static str);

    impl Check for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn applies_to(&self) -> Vec<String> {
            vec!["*".into()]
        }

        fn run(&self, artifact: &FileArtifact) -> Result<CheckResult> {
            Ok(CheckResult::pass(artifact, self.0, "ok"))
        }
    }

    #[test]
    fn registration_is_idempotent_per_type() {
        let mut registry = Registry::new();
        registry
            .register_processor(TxtProcessor)
            .register_processor(TxtProcessor);
        registry.register_check(Named("first")).register_check(Named("second"));

        assert_eq!(registry.processor_count(), 1);
        assert_eq!(registry.check_count(), 1);
        assert_eq!(registry.checks()[0].name(), "first");
    }

    #[test]
    fn snapshots_do_not_alias_internal_state() {
        let mut registry = Registry::new();
        registry.register_check(Named("only"));

        let mut snapshot = registry.checks();
        snapshot.clear();
        assert_eq!(registry.check_count(), 1);
    }

    #[test]
    fn clear_resets_everything() {
        let mut registry = Registry::new();
        registry.register_processor(TxtProcessor).register_check(Named("x"));
        registry.clear();
        assert_eq!(registry.processor_count(), 0);
        assert_eq!(registry.check_count(), 0);
    }
}
