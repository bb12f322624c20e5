//! Conversion warnings
//!
//! Adapters skip unsupported input rather than failing the whole document.
//! Each skip goes through a [`Reporter`] so callers decide where it lands.

use std::cell::RefCell;

/// Receives skipped-artifact warnings
pub trait Reporter {
    /// `artifact` is the geometry or controller name, `reason` a short message
    fn warn(&self, artifact: &str, reason: &str);
}

/// Forwards warnings to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn warn(&self, artifact: &str, reason: &str) {
        tracing::warn!(artifact, "{}", reason);
    }
}

/// Keeps warnings in memory
#[derive(Debug, Default)]
pub struct CollectingReporter {
    warnings: RefCell<Vec<(String, String)>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded `(artifact, reason)` pairs in arrival order
    pub fn warnings(&self) -> Vec<(String, String)> {
        self.warnings.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.borrow().is_empty()
    }

    /// Whether any warning for `artifact` mentions `needle`
    pub fn contains(&self, artifact: &str, needle: &str) -> bool {
        self.warnings
            .borrow()
            .iter()
            .any(|(a, r)| a == artifact && r.contains(needle))
    }
}

impl Reporter for CollectingReporter {
    fn warn(&self, artifact: &str, reason: &str) {
        tracing::debug!(artifact, "{}", reason);
        self.warnings
            .borrow_mut()
            .push((artifact.to_string(), reason.to_string()));
    }
}
