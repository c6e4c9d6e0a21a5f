//! Validation entries and the run-wide collector.
//!
//! Validations are the diagnostic layer of a run. Rules and actions append
//! entries in arrival order, and `resolve()` collapses the accumulated set
//! into the single pass/fail signal callers act on.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// How much an entry weighs when the run is resolved.
///
/// `Info` and `Warning` are advisory; a single `Fatal` entry leaves the run
/// unresolved regardless of anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationSeverity {
    Info,
    Warning,
    Fatal,
}

/// A structured diagnostic produced during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub code: String,
    pub severity: ValidationSeverity,
    pub message: String,
}

impl Validation {
    pub fn new(
        code: impl Into<String>,
        severity: ValidationSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
        }
    }

    pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, ValidationSeverity::Info, message)
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, ValidationSeverity::Warning, message)
    }

    pub fn fatal(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(code, ValidationSeverity::Fatal, message)
    }
}

#[derive(Debug, Default)]
struct CollectorInner {
    entries: Vec<Validation>,
    sealed: bool,
}

/// Ordered, append-only accumulator for one run's validations.
///
/// Cloned handles share the same buffer. The engine seals the collector when
/// the run finalizes; writes arriving after that are dropped.
#[derive(Debug, Clone, Default)]
pub struct ValidationCollector {
    inner: Arc<Mutex<CollectorInner>>,
}

impl ValidationCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry. Ignored (with a warning) once the run is sealed.
    pub fn add(&self, entry: Validation) {
        let mut inner = self.inner.lock();
        if inner.sealed {
            warn!(code = %entry.code, "validation added after finalize; dropped");
            return;
        }
        inner.entries.push(entry);
    }

    /// True iff no accumulated entry is `Fatal`.
    ///
    /// This is the authoritative pass/fail signal for a run.
    pub fn resolve(&self) -> bool {
        self.inner
            .lock()
            .entries
            .iter()
            .all(|e| e.severity != ValidationSeverity::Fatal)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop accepting writes and return a snapshot of the entries.
    pub fn seal(&self) -> Vec<Validation> {
        let mut inner = self.inner.lock();
        inner.sealed = true;
        inner.entries.clone()
    }
}
