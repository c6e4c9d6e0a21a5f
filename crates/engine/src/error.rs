//! Engine-level error types.

use thiserror::Error;

/// Errors produced by the workflow engine.
///
/// Only resolution-time errors (`UnknownWorkflow`, `MissingFactory`) reach
/// the caller as hard failures, at `start`. Node-level faults during
/// traversal are contained by the executor and converted to trace and
/// validation data — `execute_auto_finalize` always returns an inspector.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The factory could not resolve the requested workflow id.
    #[error("no workflow registered under id '{0}'")]
    UnknownWorkflow(String),

    /// `start` was called before a factory was configured.
    #[error("no workflow definition factory configured")]
    MissingFactory,

    /// An evaluator returned without writing a result into its sink.
    /// Converted to an engine fault during traversal, never surfaced.
    #[error("evaluator '{node_id}' returned without setting a result")]
    IncompleteEvaluation { node_id: String },
}
