//! Test doubles for `RuleEvaluator` and `Action`.
//!
//! Useful in unit and integration tests where a real implementation is
//! either unavailable or irrelevant.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::result::RuleResultSink;
use crate::scope::EngineScope;
use crate::traits::{Action, Definition, RuleEvaluator};
use crate::validation::Validation;

/// Behaviour injected into [`MockEvaluator`] at construction time.
pub enum MockRuleBehaviour {
    /// Report a pass.
    Pass,
    /// Report a plain failure.
    Fail,
    /// Fail and attach the given validation.
    FailWithValidation(Validation),
    /// Return an error without touching the sink.
    Fault(String),
    /// Return `Ok` without touching the sink (provokes the incomplete-
    /// evaluation fault path).
    LeaveUnset,
}

/// A mock evaluator that records every run it sees and reports a
/// programmer-specified result.
pub struct MockEvaluator {
    /// Node id used in trace assertions.
    pub id: String,
    pub behaviour: MockRuleBehaviour,
    /// Run ids seen by this evaluator (in call order).
    pub calls: Arc<Mutex<Vec<Uuid>>>,
}

impl MockEvaluator {
    fn new(id: impl Into<String>, behaviour: MockRuleBehaviour) -> Self {
        Self {
            id: id.into(),
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn passing(id: impl Into<String>) -> Self {
        Self::new(id, MockRuleBehaviour::Pass)
    }

    pub fn failing(id: impl Into<String>) -> Self {
        Self::new(id, MockRuleBehaviour::Fail)
    }

    pub fn failing_with(id: impl Into<String>, entry: Validation) -> Self {
        Self::new(id, MockRuleBehaviour::FailWithValidation(entry))
    }

    pub fn faulting(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::new(id, MockRuleBehaviour::Fault(msg.into()))
    }

    pub fn leaving_unset(id: impl Into<String>) -> Self {
        Self::new(id, MockRuleBehaviour::LeaveUnset)
    }

    /// Number of times this evaluator has been invoked.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl<M: Send> RuleEvaluator<M> for MockEvaluator {
    fn definition(&self) -> Definition {
        Definition::new(self.id.clone(), "mock rule evaluator")
    }

    async fn evaluate(
        &self,
        scope: &EngineScope<M>,
        result: &mut RuleResultSink,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        self.calls.lock().push(scope.run_id());

        match &self.behaviour {
            MockRuleBehaviour::Pass => result.pass(),
            MockRuleBehaviour::Fail => result.fail(),
            MockRuleBehaviour::FailWithValidation(entry) => {
                result.fail_with_validation(entry.clone());
            }
            MockRuleBehaviour::Fault(msg) => anyhow::bail!("{msg}"),
            MockRuleBehaviour::LeaveUnset => {}
        }
        Ok(())
    }
}

/// Behaviour injected into [`MockAction`] at construction time.
pub enum MockActionBehaviour {
    /// Complete successfully.
    Complete,
    /// Report boolean-false completion.
    Incomplete,
    /// Report boolean-false completion and push the given validation
    /// through the scope.
    PushValidation(Validation),
    /// Return an error.
    Fault(String),
}

/// A mock action that records every run it sees.
pub struct MockAction {
    /// Node id used in trace assertions.
    pub id: String,
    pub behaviour: MockActionBehaviour,
    /// Run ids seen by this action (in call order).
    pub calls: Arc<Mutex<Vec<Uuid>>>,
}

impl MockAction {
    fn new(id: impl Into<String>, behaviour: MockActionBehaviour) -> Self {
        Self {
            id: id.into(),
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn completing(id: impl Into<String>) -> Self {
        Self::new(id, MockActionBehaviour::Complete)
    }

    pub fn incomplete(id: impl Into<String>) -> Self {
        Self::new(id, MockActionBehaviour::Incomplete)
    }

    pub fn pushing_validation(id: impl Into<String>, entry: Validation) -> Self {
        Self::new(id, MockActionBehaviour::PushValidation(entry))
    }

    pub fn faulting(id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::new(id, MockActionBehaviour::Fault(msg.into()))
    }

    /// Number of times this action has been executed.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl<M: Send> Action<M> for MockAction {
    fn definition(&self) -> Definition {
        Definition::new(self.id.clone(), "mock action")
    }

    async fn execute(
        &self,
        scope: &EngineScope<M>,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<bool> {
        self.calls.lock().push(scope.run_id());

        match &self.behaviour {
            MockActionBehaviour::Complete => Ok(true),
            MockActionBehaviour::Incomplete => Ok(false),
            MockActionBehaviour::PushValidation(entry) => {
                scope.validations().add(entry.clone());
                Ok(false)
            }
            MockActionBehaviour::Fault(msg) => anyhow::bail!("{msg}"),
        }
    }
}
