//! The `RuleEvaluator` and `Action` traits — the contracts every pluggable
//! unit must fulfil.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::result::RuleResultSink;
use crate::scope::EngineScope;

/// Identity metadata for an evaluator or action.
///
/// The `id` names the node in the trace; the description is for humans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub id: String,
    pub description: String,
}

impl Definition {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

/// A pluggable predicate over the model.
///
/// Implementations are stateless across runs and may be shared by concurrent
/// executions. `evaluate` must write exactly one result into the sink before
/// returning; a sink left unset is treated as an engine fault. Evaluators are
/// expected to be read-only over the model — mutation is not forbidden, but
/// branching correctness assumes none happens mid-evaluation. Returning `Err`
/// signals an unhandled fault, which the engine converts to a fatal
/// validation and an early terminal.
#[async_trait]
pub trait RuleEvaluator<M>: Send + Sync {
    fn definition(&self) -> Definition;

    async fn evaluate(
        &self,
        scope: &EngineScope<M>,
        result: &mut RuleResultSink,
        cancel: &CancellationToken,
    ) -> anyhow::Result<()>;
}

/// A pluggable side-effecting step over the model.
///
/// `execute` returns a completion flag: `false` means the action did not
/// complete as intended. That flag alone is advisory — traversal continues —
/// so an action that must stop the run pushes a fatal validation through the
/// scope instead. Returning `Err` is an unhandled fault, handled like an
/// evaluator fault.
#[async_trait]
pub trait Action<M>: Send + Sync {
    fn definition(&self) -> Definition;

    async fn execute(
        &self,
        scope: &EngineScope<M>,
        cancel: &CancellationToken,
    ) -> anyhow::Result<bool>;
}
