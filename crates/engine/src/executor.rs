//! Workflow execution engine.
//!
//! `Engine` is the central orchestrator:
//! 1. Resolves a workflow id (or accepts a prebuilt graph) to an immutable tree.
//! 2. Builds the per-run trace and validation collector at `start`.
//! 3. Walks the tree one node at a time, dispatching `RuleEvaluator` and
//!    `Action` implementations and recording every visit in the trace.
//! 4. Contains node-level faults: an evaluator/action error (or an unset
//!    result sink) becomes a `Fault` trace record plus a fatal `engineFault`
//!    validation, and traversal terminates early.
//! 5. Finalizes exactly once on every exit path (including fault and
//!    cancellation), sealing the trace and collector before handing back
//!    the inspector.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use contracts::{
    EngineScope, ExecutionTrace, RuleResult, RuleResultSink, TraceKind, TraceRecord, Validation,
    ValidationCollector,
};

use crate::error::EngineError;
use crate::factory::WorkflowFactory;
use crate::graph::{WorkflowGraph, WorkflowNode};

/// Validation code synthesized when a node faults.
pub const ENGINE_FAULT_CODE: &str = "engineFault";

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Stateless front door to the engine: holds the factory, creates runs.
///
/// One engine may start any number of runs; each run owns its scope, trace,
/// and collector, so runs over the same graph execute fully in parallel.
pub struct Engine<M> {
    factory: Option<Arc<dyn WorkflowFactory<M>>>,
}

impl<M: Send + 'static> Engine<M> {
    pub fn new() -> Self {
        Self { factory: None }
    }

    /// Register how workflow ids resolve to graphs.
    pub fn with_factory(mut self, factory: impl WorkflowFactory<M> + 'static) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Resolve `workflow_id` through the factory and prepare a run over
    /// `model`.
    ///
    /// # Errors
    /// [`EngineError::MissingFactory`] when no factory was registered,
    /// [`EngineError::UnknownWorkflow`] when the id does not resolve. No run
    /// state is created on either.
    pub fn start(&self, workflow_id: &str, model: M) -> Result<EngineRun<M>, EngineError> {
        let factory = self.factory.as_ref().ok_or(EngineError::MissingFactory)?;
        let graph = factory.resolve(workflow_id)?;
        Ok(self.start_with_graph(graph, model))
    }

    /// Prepare a run over an already-built graph, bypassing the factory.
    pub fn start_with_graph(&self, graph: Arc<WorkflowGraph<M>>, model: M) -> EngineRun<M> {
        EngineRun {
            graph,
            model,
            trace: ExecutionTrace::new(),
            validations: ValidationCollector::new(),
        }
    }
}

impl<M: Send + 'static> Default for Engine<M> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// EngineRun
// ---------------------------------------------------------------------------

/// A prepared run: graph plus the fresh per-run artifacts.
pub struct EngineRun<M> {
    graph: Arc<WorkflowGraph<M>>,
    model: M,
    trace: ExecutionTrace,
    validations: ValidationCollector,
}

impl<M: Send + 'static> EngineRun<M> {
    /// Walk the graph to completion, fault, or cancellation, then finalize.
    ///
    /// Finalization seals the trace and the validation collector exactly
    /// once; node-level failures never propagate past this call — the
    /// inspector is always returned.
    #[instrument(skip(self, cancel), fields(workflow_id = %self.graph.id()))]
    pub async fn execute_auto_finalize(self, cancel: CancellationToken) -> RunInspector<M> {
        let EngineRun {
            graph,
            model,
            trace,
            validations,
        } = self;

        let scope = EngineScope::new(
            graph.id(),
            model,
            trace.clone(),
            validations.clone(),
            cancel,
        );
        info!(run_id = %scope.run_id(), depth = graph.depth(), "executing workflow");

        let cancelled = walk(graph.root(), &scope).await;

        let resolved = validations.resolve();
        let trace_records = trace.seal();
        let validation_entries = validations.seal();

        info!(
            run_id = %scope.run_id(),
            resolved,
            cancelled,
            validations = validation_entries.len(),
            "workflow run finalized"
        );

        RunInspector {
            run_id: scope.run_id(),
            workflow_id: graph.id().to_owned(),
            validations: validation_entries,
            trace: trace_records,
            resolved,
            cancelled,
            model: scope.into_model(),
        }
    }
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Single-path depth-first walk. Returns true when cancellation cut the run
/// short.
async fn walk<M: Send>(root: &WorkflowNode<M>, scope: &EngineScope<M>) -> bool {
    let cancel = scope.cancellation().clone();
    let mut node = root;

    loop {
        // Cancellation is observed between node visits; remaining nodes are
        // treated as unreached.
        if cancel.is_cancelled() {
            warn!(workflow_id = scope.workflow_id(), "run cancelled");
            return true;
        }

        match node {
            WorkflowNode::Terminal => return false,

            WorkflowNode::Condition {
                evaluator,
                then_branch,
                else_branch,
            } => {
                let def = evaluator.definition();
                scope.trace().record(&def.id, TraceKind::Enter);

                let mut sink = RuleResultSink::new();
                let result = match evaluator.evaluate(scope, &mut sink, &cancel).await {
                    Err(err) => {
                        fault(scope, &def.id, &format!("{err:#}"));
                        return false;
                    }
                    Ok(()) => match sink.finish() {
                        Some(result) => result,
                        None => {
                            let err = EngineError::IncompleteEvaluation {
                                node_id: def.id.clone(),
                            };
                            fault(scope, &def.id, &err.to_string());
                            return false;
                        }
                    },
                };

                // Branching is driven purely by the boolean interpretation;
                // validations only feed resolution.
                let decision = result.as_bool();
                if let RuleResult::FailWithValidations(entries) = result {
                    for entry in entries {
                        scope.validations().add(entry);
                    }
                }

                scope.trace().record_detail(
                    &def.id,
                    TraceKind::RuleDecision,
                    if decision { "pass" } else { "fail" },
                );
                scope.trace().record(&def.id, TraceKind::Exit);

                node = if decision {
                    then_branch.as_ref()
                } else {
                    match else_branch {
                        Some(branch) => branch.as_ref(),
                        None => return false,
                    }
                };
            }

            WorkflowNode::ActionStep { action, next } => {
                let def = action.definition();
                scope.trace().record(&def.id, TraceKind::Enter);

                match action.execute(scope, &cancel).await {
                    Err(err) => {
                        fault(scope, &def.id, &format!("{err:#}"));
                        return false;
                    }
                    Ok(completed) => {
                        scope.trace().record_detail(
                            &def.id,
                            TraceKind::ActionOutcome,
                            if completed { "completed" } else { "incomplete" },
                        );
                        if !completed {
                            // Boolean-false is advisory; only validations
                            // affect resolution.
                            warn!(action = %def.id, "action reported incomplete; continuing");
                        }
                        scope.trace().record(&def.id, TraceKind::Exit);
                        node = next.as_ref();
                    }
                }
            }
        }
    }
}

/// Contain a node fault: record it, poison resolution, close the node.
fn fault<M>(scope: &EngineScope<M>, node_id: &str, detail: &str) {
    error!(node = node_id, "node faulted: {detail}");
    scope
        .trace()
        .record_detail(node_id, TraceKind::Fault, detail);
    scope
        .validations()
        .add(Validation::fatal(ENGINE_FAULT_CODE, detail));
    scope.trace().record(node_id, TraceKind::Exit);
}

// ---------------------------------------------------------------------------
// RunInspector
// ---------------------------------------------------------------------------

/// The terminal artifact of a run: sealed validations, sealed trace, the
/// resolution and cancellation flags, and the model handed back to the
/// caller.
#[derive(Debug)]
pub struct RunInspector<M> {
    run_id: Uuid,
    workflow_id: String,
    validations: Vec<Validation>,
    trace: Vec<TraceRecord>,
    resolved: bool,
    cancelled: bool,
    model: M,
}

impl<M> RunInspector<M> {
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn workflow_id(&self) -> &str {
        &self.workflow_id
    }

    /// All validations accumulated during the run, in arrival order.
    pub fn validations(&self) -> &[Validation] {
        &self.validations
    }

    /// The full visit log, in traversal order.
    pub fn trace(&self) -> &[TraceRecord] {
        &self.trace
    }

    /// True iff no fatal validation was recorded.
    pub fn resolved(&self) -> bool {
        self.resolved
    }

    /// True when cancellation cut the traversal short.
    pub fn cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn into_model(self) -> M {
        self.model
    }
}
