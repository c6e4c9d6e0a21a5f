//! Per-run engine scope.
//!
//! One scope exists per run and is never reused. It bundles the caller's
//! model, the trace and validation handles, and the cancellation token, so
//! evaluators and actions reach everything run-local through a single
//! reference.

use tokio::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::trace::ExecutionTrace;
use crate::validation::ValidationCollector;

/// Run-local context handed to every evaluator and action.
#[derive(Debug)]
pub struct EngineScope<M> {
    run_id: Uuid,
    workflow_id: String,
    model: Mutex<M>,
    trace: ExecutionTrace,
    validations: ValidationCollector,
    cancellation: CancellationToken,
}

impl<M> EngineScope<M> {
    pub fn new(
        workflow_id: impl Into<String>,
        model: M,
        trace: ExecutionTrace,
        validations: ValidationCollector,
        cancellation: CancellationToken,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            workflow_id: workflow_id.into(),
            model: Mutex::new(model),
            trace,
            validations,
            cancellation,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// Lock the model for reading or mutation.
    ///
    /// Traversal is single-path sequential, so the lock is uncontended
    /// within a run; it exists so actions can mutate the model through a
    /// shared scope reference.
    pub async fn model(&self) -> MutexGuard<'_, M> {
        self.model.lock().await
    }

    pub fn trace(&self) -> &ExecutionTrace {
        &self.trace
    }

    pub fn validations(&self) -> &ValidationCollector {
        &self.validations
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Hand the model back to the caller when the run finalizes.
    pub fn into_model(self) -> M {
        self.model.into_inner()
    }
}
