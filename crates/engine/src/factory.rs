//! Workflow resolution — how a workflow id becomes an executable graph.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::EngineError;
use crate::graph::WorkflowGraph;

/// Resolves a workflow id to a shareable graph.
///
/// Consumed by the engine at `start`; a failed resolution surfaces to the
/// caller immediately and no run is created. Callers that already hold a
/// graph can skip resolution entirely via `start_with_graph`.
pub trait WorkflowFactory<M>: Send + Sync {
    fn resolve(&self, workflow_id: &str) -> Result<Arc<WorkflowGraph<M>>, EngineError>;
}

/// Maps workflow ids to prebuilt graphs.
pub type GraphRegistry<M> = HashMap<String, Arc<WorkflowGraph<M>>>;

impl<M> WorkflowFactory<M> for GraphRegistry<M>
where
    M: Send + Sync,
{
    fn resolve(&self, workflow_id: &str) -> Result<Arc<WorkflowGraph<M>>, EngineError> {
        self.get(workflow_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownWorkflow(workflow_id.to_owned()))
    }
}
