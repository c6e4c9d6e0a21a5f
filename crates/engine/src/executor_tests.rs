//! Integration tests for the workflow execution engine.
//!
//! These tests use the mock evaluators/actions from the `contracts` crate
//! for the structural properties, plus a pair of small real workflows (an
//! estimate-approval flow and a message-moderation flow) for end-to-end
//! scenarios.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use contracts::mock::{MockAction, MockEvaluator};
use contracts::{
    Action, Definition, EngineScope, RuleEvaluator, RuleResultSink, TraceKind, TraceRecord,
    Validation, ValidationSeverity,
};

use crate::{
    Engine, EngineError, GraphRegistry, WorkflowGraph, WorkflowNode, ENGINE_FAULT_CODE,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn node_ids(trace: &[TraceRecord], kind: TraceKind) -> Vec<String> {
    trace
        .iter()
        .filter(|r| r.kind == kind)
        .map(|r| r.node_id.clone())
        .collect()
}

async fn run_graph<M: Send + 'static>(
    graph: WorkflowGraph<M>,
    model: M,
) -> crate::RunInspector<M> {
    Engine::new()
        .start_with_graph(Arc::new(graph), model)
        .execute_auto_finalize(CancellationToken::new())
        .await
}

// ============================================================
// Branching
// ============================================================

#[tokio::test]
async fn then_branch_runs_when_rule_passes() {
    let then_action = MockAction::completing("then");
    let then_calls = then_action.calls.clone();
    let else_action = MockAction::completing("else");
    let else_calls = else_action.calls.clone();

    let graph = WorkflowGraph::new(
        "branch",
        WorkflowNode::condition_else(
            MockEvaluator::passing("gate"),
            WorkflowNode::action(then_action, WorkflowNode::terminal()),
            WorkflowNode::action(else_action, WorkflowNode::terminal()),
        ),
    );

    let inspector = run_graph(graph, ()).await;

    assert!(inspector.resolved());
    assert!(!inspector.cancelled());
    assert!(inspector.validations().is_empty());
    assert_eq!(then_calls.lock().len(), 1);
    assert_eq!(else_calls.lock().len(), 0);
    assert_eq!(
        node_ids(inspector.trace(), TraceKind::Enter),
        vec!["gate", "then"]
    );
}

#[tokio::test]
async fn else_branch_runs_when_rule_fails() {
    let then_action = MockAction::completing("then");
    let then_calls = then_action.calls.clone();
    let else_action = MockAction::completing("else");
    let else_calls = else_action.calls.clone();

    let graph = WorkflowGraph::new(
        "branch",
        WorkflowNode::condition_else(
            MockEvaluator::failing("gate"),
            WorkflowNode::action(then_action, WorkflowNode::terminal()),
            WorkflowNode::action(else_action, WorkflowNode::terminal()),
        ),
    );

    let inspector = run_graph(graph, ()).await;

    assert!(inspector.resolved());
    assert_eq!(then_calls.lock().len(), 0);
    assert_eq!(else_calls.lock().len(), 1);
    assert_eq!(
        node_ids(inspector.trace(), TraceKind::Enter),
        vec!["gate", "else"]
    );
}

#[tokio::test]
async fn absent_else_branch_ends_the_run() {
    let skipped = MockAction::completing("skipped");
    let skipped_calls = skipped.calls.clone();

    let graph = WorkflowGraph::new(
        "one-sided",
        WorkflowNode::condition(
            MockEvaluator::failing("gate"),
            WorkflowNode::action(skipped, WorkflowNode::terminal()),
        ),
    );

    let inspector = run_graph(graph, ()).await;

    assert!(inspector.resolved());
    assert_eq!(skipped_calls.lock().len(), 0);
    assert_eq!(node_ids(inspector.trace(), TraceKind::Enter), vec!["gate"]);
}

#[tokio::test]
async fn validation_failure_branches_by_boolean_and_records_entries() {
    // A fatal validation does not redirect branching on its own: the rule
    // failed, so the else branch still runs, while resolution is blocked.
    let else_action = MockAction::completing("fallback");
    let else_calls = else_action.calls.clone();

    let graph = WorkflowGraph::new(
        "diagnosed",
        WorkflowNode::condition_else(
            MockEvaluator::failing_with(
                "gate",
                Validation::fatal("limitBreached", "limit breached"),
            ),
            WorkflowNode::terminal(),
            WorkflowNode::action(else_action, WorkflowNode::terminal()),
        ),
    );

    let inspector = run_graph(graph, ()).await;

    assert!(!inspector.resolved());
    assert_eq!(else_calls.lock().len(), 1);
    assert_eq!(inspector.validations().len(), 1);
    assert_eq!(inspector.validations()[0].code, "limitBreached");
}

// ============================================================
// Faults
// ============================================================

#[tokio::test]
async fn faulting_evaluator_synthesizes_engine_fault() {
    let never = MockAction::completing("never");
    let never_calls = never.calls.clone();

    let graph = WorkflowGraph::new(
        "faulty",
        WorkflowNode::condition(
            MockEvaluator::faulting("boom", "something broke irreparably"),
            WorkflowNode::action(never, WorkflowNode::terminal()),
        ),
    );

    let inspector = run_graph(graph, ()).await;

    // Exactly one fatal validation, traversal halted at the faulting node.
    assert!(!inspector.resolved());
    assert_eq!(never_calls.lock().len(), 0);
    assert_eq!(inspector.validations().len(), 1);
    assert_eq!(inspector.validations()[0].code, ENGINE_FAULT_CODE);
    assert_eq!(
        inspector.validations()[0].severity,
        ValidationSeverity::Fatal
    );
    assert_eq!(node_ids(inspector.trace(), TraceKind::Fault), vec!["boom"]);
    assert_eq!(
        node_ids(inspector.trace(), TraceKind::Enter),
        node_ids(inspector.trace(), TraceKind::Exit)
    );
}

#[tokio::test]
async fn unset_result_sink_is_an_engine_fault() {
    let graph = WorkflowGraph::new(
        "silent",
        WorkflowNode::condition(
            MockEvaluator::leaving_unset("mute"),
            WorkflowNode::terminal(),
        ),
    );

    let inspector = run_graph(graph, ()).await;

    assert!(!inspector.resolved());
    assert_eq!(inspector.validations().len(), 1);
    assert_eq!(inspector.validations()[0].code, ENGINE_FAULT_CODE);
    assert!(inspector.validations()[0]
        .message
        .contains("without setting a result"));
}

#[tokio::test]
async fn faulting_action_synthesizes_engine_fault() {
    let never = MockAction::completing("never");
    let never_calls = never.calls.clone();

    let graph = WorkflowGraph::new(
        "faulty-action",
        WorkflowNode::action(
            MockAction::faulting("boom", "side effect exploded"),
            WorkflowNode::action(never, WorkflowNode::terminal()),
        ),
    );

    let inspector = run_graph(graph, ()).await;

    assert!(!inspector.resolved());
    assert_eq!(never_calls.lock().len(), 0);
    assert_eq!(inspector.validations()[0].code, ENGINE_FAULT_CODE);
    assert_eq!(node_ids(inspector.trace(), TraceKind::Fault), vec!["boom"]);
}

// ============================================================
// Action completion policy
// ============================================================

#[tokio::test]
async fn incomplete_action_does_not_halt_traversal() {
    let flaky = MockAction::incomplete("flaky");
    let flaky_calls = flaky.calls.clone();
    let after = MockAction::completing("after");
    let after_calls = after.calls.clone();

    let graph = WorkflowGraph::new(
        "advisory",
        WorkflowNode::action(
            flaky,
            WorkflowNode::action(after, WorkflowNode::terminal()),
        ),
    );

    let inspector = run_graph(graph, ()).await;

    // Boolean-false is advisory: the next step still ran and resolution
    // is untouched.
    assert!(inspector.resolved());
    assert_eq!(flaky_calls.lock().len(), 1);
    assert_eq!(after_calls.lock().len(), 1);

    let outcomes: Vec<_> = inspector
        .trace()
        .iter()
        .filter(|r| r.kind == TraceKind::ActionOutcome)
        .map(|r| r.detail.clone().unwrap())
        .collect();
    assert_eq!(outcomes, vec!["incomplete", "completed"]);
}

#[tokio::test]
async fn action_pushed_fatal_validation_blocks_resolution_but_not_traversal() {
    let after = MockAction::completing("after");
    let after_calls = after.calls.clone();

    let graph = WorkflowGraph::new(
        "strict-action",
        WorkflowNode::action(
            MockAction::pushing_validation(
                "guard",
                Validation::fatal("sideEffectRefused", "downstream said no"),
            ),
            WorkflowNode::action(after, WorkflowNode::terminal()),
        ),
    );

    let inspector = run_graph(graph, ()).await;

    assert!(!inspector.resolved());
    assert_eq!(after_calls.lock().len(), 1);
    assert_eq!(inspector.validations()[0].code, "sideEffectRefused");
}

// ============================================================
// Cancellation
// ============================================================

#[tokio::test]
async fn pre_cancelled_run_finalizes_empty_and_resolved() {
    let untouched = MockAction::completing("untouched");
    let untouched_calls = untouched.calls.clone();

    let graph = WorkflowGraph::new(
        "cancelled",
        WorkflowNode::action(untouched, WorkflowNode::terminal()),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();

    let inspector = Engine::new()
        .start_with_graph(Arc::new(graph), ())
        .execute_auto_finalize(cancel)
        .await;

    assert!(inspector.cancelled());
    assert!(inspector.trace().is_empty());
    assert!(inspector.validations().is_empty());
    // Resolution reflects whatever was accumulated — nothing, so resolved.
    assert!(inspector.resolved());
    assert_eq!(untouched_calls.lock().len(), 0);
}

// ============================================================
// Trace shape
// ============================================================

#[tokio::test]
async fn enter_and_exit_records_pair_up() {
    let graph = WorkflowGraph::new(
        "deep",
        WorkflowNode::condition_else(
            MockEvaluator::passing("first"),
            WorkflowNode::action(
                MockAction::completing("second"),
                WorkflowNode::condition(
                    MockEvaluator::failing("third"),
                    WorkflowNode::terminal(),
                ),
            ),
            WorkflowNode::terminal(),
        ),
    );

    let depth = graph.depth();
    let inspector = run_graph(graph, ()).await;

    let enters = node_ids(inspector.trace(), TraceKind::Enter);
    let exits = node_ids(inspector.trace(), TraceKind::Exit);
    assert_eq!(enters, vec!["first", "second", "third"]);
    assert_eq!(enters, exits);
    // The tree depth bounds how many nodes any single run can visit.
    assert!(enters.len() <= depth);
}

#[tokio::test]
async fn identical_models_yield_identical_trace_shapes() {
    let graph = Arc::new(WorkflowGraph::new(
        "repeatable",
        WorkflowNode::condition_else(
            MockEvaluator::passing("gate"),
            WorkflowNode::action(MockAction::completing("step"), WorkflowNode::terminal()),
            WorkflowNode::terminal(),
        ),
    ));

    let engine: Engine<()> = Engine::new();
    let first = engine
        .start_with_graph(graph.clone(), ())
        .execute_auto_finalize(CancellationToken::new())
        .await;
    let second = engine
        .start_with_graph(graph, ())
        .execute_auto_finalize(CancellationToken::new())
        .await;

    let shape = |trace: &[TraceRecord]| {
        trace
            .iter()
            .map(|r| (r.node_id.clone(), r.kind))
            .collect::<Vec<_>>()
    };
    assert_eq!(shape(first.trace()), shape(second.trace()));
    assert_ne!(first.run_id(), second.run_id());
}

// ============================================================
// Factory resolution
// ============================================================

fn single_action_registry(id: &str) -> GraphRegistry<()> {
    let mut registry = GraphRegistry::new();
    registry.insert(
        id.to_owned(),
        Arc::new(WorkflowGraph::new(
            id,
            WorkflowNode::action(MockAction::completing("step"), WorkflowNode::terminal()),
        )),
    );
    registry
}

#[tokio::test]
async fn registry_start_resolves_and_runs() {
    let engine = Engine::new().with_factory(single_action_registry("example"));

    let inspector = engine
        .start("example", ())
        .expect("workflow is registered")
        .execute_auto_finalize(CancellationToken::new())
        .await;

    assert!(inspector.resolved());
    assert_eq!(inspector.workflow_id(), "example");
}

#[tokio::test]
async fn unknown_workflow_is_rejected_at_start() {
    let engine = Engine::new().with_factory(single_action_registry("example"));

    assert!(matches!(
        engine.start("ghost", ()).err(),
        Some(EngineError::UnknownWorkflow(id)) if id == "ghost"
    ));
}

#[tokio::test]
async fn start_without_factory_is_rejected() {
    let engine: Engine<()> = Engine::new();
    assert!(matches!(
        engine.start("anything", ()).err(),
        Some(EngineError::MissingFactory)
    ));
}

// ============================================================
// Scenario: estimate approval
// ============================================================

#[derive(Debug, Default)]
struct Estimate {
    amount: f64,
    decision_requested: bool,
    auto_approved: bool,
}

struct ExceedsThreshold;

#[async_trait]
impl RuleEvaluator<Estimate> for ExceedsThreshold {
    fn definition(&self) -> Definition {
        Definition::new("thresholdTest", "Evaluates if the estimate exceeds the threshold")
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

struct RequestDecision;

#[async_trait]
impl Action<Estimate> for RequestDecision {
    fn definition(&self) -> Definition {
        Definition::new("sendDecisionRequest", "Sends a decision request to the customer")
    }

    async fn execute(
        &self,
        scope: &EngineScope<Estimate>,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<bool> {
        scope.model().await.decision_requested = true;
        Ok(true)
    }
}

struct AutoApprove;

#[async_trait]
impl Action<Estimate> for AutoApprove {
    fn definition(&self) -> Definition {
        Definition::new("autoApprove", "Approves the estimate on the customer's behalf")
    }

    async fn execute(
        &self,
        scope: &EngineScope<Estimate>,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<bool> {
        scope.model().await.auto_approved = true;
        Ok(true)
    }
}

fn approval_graph() -> WorkflowGraph<Estimate> {
    WorkflowGraph::new(
        "example",
        WorkflowNode::condition_else(
            ExceedsThreshold,
            WorkflowNode::action(RequestDecision, WorkflowNode::terminal()),
            WorkflowNode::action(AutoApprove, WorkflowNode::terminal()),
        ),
    )
}

#[tokio::test]
async fn estimate_at_threshold_auto_approves() {
    let model = Estimate {
        amount: 500.00,
        ..Default::default()
    };

    let inspector = run_graph(approval_graph(), model).await;

    assert!(inspector.resolved());
    assert!(inspector.validations().is_empty());
    let model = inspector.into_model();
    assert!(model.auto_approved);
    assert!(!model.decision_requested);
}

#[tokio::test]
async fn estimate_over_threshold_requests_decision() {
    let model = Estimate {
        amount: 1000.00,
        ..Default::default()
    };

    let inspector = run_graph(approval_graph(), model).await;

    assert!(inspector.resolved());
    assert!(inspector.validations().is_empty());
    let model = inspector.into_model();
    assert!(model.decision_requested);
    assert!(!model.auto_approved);
}

// ============================================================
// Scenario: message moderation
// ============================================================

#[derive(Debug, Default)]
struct MessagePost {
    message: String,
    posted: bool,
}

struct MessageIsClean;

#[async_trait]
impl RuleEvaluator<MessagePost> for MessageIsClean {
    fn definition(&self) -> Definition {
        Definition::new("isMessageClean", "Determines if the message is appropriate")
    }

    async fn evaluate(
        &self,
        scope: &EngineScope<MessagePost>,
        result: &mut RuleResultSink,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        if scope.model().await.message.contains("badword") {
            result.fail_with_validation(Validation::fatal(
                "badword",
                "message contains forbidden content",
            ));
        } else {
            result.pass();
        }
        Ok(())
    }
}

struct PostMessage;

#[async_trait]
impl Action<MessagePost> for PostMessage {
    fn definition(&self) -> Definition {
        Definition::new("postMessage", "Persists the user's message")
    }

    async fn execute(
        &self,
        scope: &EngineScope<MessagePost>,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<bool> {
        scope.model().await.posted = true;
        Ok(true)
    }
}

fn moderation_graph() -> WorkflowGraph<MessagePost> {
    WorkflowGraph::new(
        "postMessage",
        WorkflowNode::condition(MessageIsClean, WorkflowNode::action(PostMessage, WorkflowNode::terminal())),
    )
}

#[tokio::test]
async fn unclean_message_is_rejected_and_not_posted() {
    let model = MessagePost {
        message: "contains badword".into(),
        ..Default::default()
    };

    let inspector = run_graph(moderation_graph(), model).await;

    assert!(!inspector.resolved());
    assert_eq!(inspector.validations().len(), 1);
    assert_eq!(inspector.validations()[0].code, "badword");
    assert_eq!(
        inspector.validations()[0].severity,
        ValidationSeverity::Fatal
    );
    assert!(!inspector.into_model().posted);
}

#[tokio::test]
async fn clean_message_posts() {
    let model = MessagePost {
        message: "perfectly fine".into(),
        ..Default::default()
    };

    let inspector = run_graph(moderation_graph(), model).await;

    assert!(inspector.resolved());
    assert!(inspector.validations().is_empty());
    assert!(inspector.into_model().posted);
}
