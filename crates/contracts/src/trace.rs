//! Per-run execution trace.
//!
//! The trace is an ordered, append-only log of node visits: `Enter` before a
//! node does any work, `Exit` after, with the decision/outcome records in
//! between. Records are never reordered — traversal is single-path
//! sequential, so arrival order is program order. After the run finalizes the
//! trace is sealed and read-only.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// What a trace record marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Enter,
    RuleDecision,
    ActionOutcome,
    Fault,
    Exit,
}

/// One entry in the trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Identity of the evaluator/action visited.
    pub node_id: String,
    pub kind: TraceKind,
    pub timestamp: DateTime<Utc>,
    /// Human-readable context: the decision taken, the outcome, or the fault.
    pub detail: Option<String>,
}

#[derive(Debug, Default)]
struct TraceInner {
    records: Vec<TraceRecord>,
    sealed: bool,
}

/// Shared handle to one run's trace buffer.
#[derive(Debug, Clone, Default)]
pub struct ExecutionTrace {
    inner: Arc<Mutex<TraceInner>>,
}

impl ExecutionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record with no detail.
    pub fn record(&self, node_id: &str, kind: TraceKind) {
        self.push(node_id, kind, None);
    }

    /// Append a record carrying detail text.
    pub fn record_detail(&self, node_id: &str, kind: TraceKind, detail: impl Into<String>) {
        self.push(node_id, kind, Some(detail.into()));
    }

    fn push(&self, node_id: &str, kind: TraceKind, detail: Option<String>) {
        let mut inner = self.inner.lock();
        if inner.sealed {
            warn!(node_id, "trace record after finalize; dropped");
            return;
        }
        inner.records.push(TraceRecord {
            node_id: node_id.to_owned(),
            kind,
            timestamp: Utc::now(),
            detail,
        });
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop accepting writes and return a snapshot of the records.
    pub fn seal(&self) -> Vec<TraceRecord> {
        let mut inner = self.inner.lock();
        inner.sealed = true;
        inner.records.clone()
    }
}
