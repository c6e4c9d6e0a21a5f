//! Estimate-approval demo.
//!
//! A customer approval process: in certain conditions we can decide on the
//! customer's behalf, otherwise we ask them to review. Under the threshold
//! the estimate is auto-approved; over it a decision request goes out.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use contracts::{Action, Definition, EngineScope, RuleEvaluator, RuleResultSink};
use engine::{Engine, GraphRegistry, WorkflowGraph, WorkflowNode};

/// Model for the demo.
#[derive(Debug)]
struct Estimate {
    amount: f64,
}

struct ExceedsThresholdEvaluator;

#[async_trait]
impl RuleEvaluator<Estimate> for ExceedsThresholdEvaluator {
    fn definition(&self) -> Definition {
        Definition::new(
            "thresholdTest",
            "Evaluates if the estimate exceeds the approval threshold",
        )
    }

    async fn evaluate(
        &self,
        scope: &EngineScope<Estimate>,
        result: &mut RuleResultSink,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        result.set_result(scope.model().await.amount > 500.00);
        Ok(())
    }
}

struct SendDecisionRequestAction;

#[async_trait]
impl Action<Estimate> for SendDecisionRequestAction {
    fn definition(&self) -> Definition {
        Definition::new(
            "sendDecisionRequest",
            "Sends a request to the customer for a decision",
        )
    }

    async fn execute(
        &self,
        scope: &EngineScope<Estimate>,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<bool> {
        println!(
            "Sending request to customer since {:.2} exceeds the threshold",
            scope.model().await.amount
        );
        Ok(true)
    }
}

struct AutoApproveAction;

#[async_trait]
impl Action<Estimate> for AutoApproveAction {
    fn definition(&self) -> Definition {
        Definition::new("autoApprove", "Approves the estimate on the customer's behalf")
    }

    async fn execute(
        &self,
        scope: &EngineScope<Estimate>,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<bool> {
        println!(
            "Auto approving since {:.2} is within the threshold",
            scope.model().await.amount
        );
        Ok(true)
    }
}

fn registry() -> GraphRegistry<Estimate> {
    let mut registry = GraphRegistry::new();
    registry.insert(
        "example".to_owned(),
        Arc::new(WorkflowGraph::new(
            "example",
            WorkflowNode::condition_else(
                ExceedsThresholdEvaluator,
                WorkflowNode::action(SendDecisionRequestAction, WorkflowNode::terminal()),
                WorkflowNode::action(AutoApproveAction, WorkflowNode::terminal()),
            ),
        )),
    );
    registry
}

/// Run the demo workflow for one estimate amount and print the trace.
pub async fn run(amount: f64) -> anyhow::Result<()> {
    println!("--- estimate: {amount:.2} ---");

    let engine = Engine::new().with_factory(registry());
    let inspector = engine
        .start("example", Estimate { amount })?
        .execute_auto_finalize(CancellationToken::new())
        .await;

    for record in inspector.trace() {
        match &record.detail {
            Some(detail) => println!("  {:>14?}  {} ({detail})", record.kind, record.node_id),
            None => println!("  {:>14?}  {}", record.kind, record.node_id),
        }
    }
    println!("resolved: {}", inspector.resolved());

    Ok(())
}
