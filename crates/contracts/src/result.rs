//! Rule outcomes and the sink evaluators write them through.
//!
//! An evaluator never returns a bare boolean to be interpreted by its caller;
//! it reports pass/fail/fail-with-detail into a [`RuleResultSink`] provided
//! by the engine. Leaving the sink unset is an engine-level fault.

use crate::validation::Validation;

/// The outcome of one rule evaluation.
///
/// Attaching validations implies failure: branching is driven purely by the
/// boolean interpretation, the entries are diagnostic signals layered on top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleResult {
    Pass,
    Fail,
    FailWithValidations(Vec<Validation>),
}

impl RuleResult {
    /// The branch decision this result drives.
    pub fn as_bool(&self) -> bool {
        matches!(self, RuleResult::Pass)
    }
}

/// Write-once holder the engine hands to each evaluator.
///
/// The setters may be called more than once; the last boolean wins, and
/// validation entries accumulate. `finish` yields `None` when the evaluator
/// returned without reporting anything.
#[derive(Debug, Default)]
pub struct RuleResultSink {
    outcome: Option<bool>,
    validations: Vec<Validation>,
}

impl RuleResultSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a passing evaluation.
    pub fn pass(&mut self) {
        self.outcome = Some(true);
    }

    /// Report a failing evaluation with no further detail.
    pub fn fail(&mut self) {
        self.outcome = Some(false);
    }

    /// Report the evaluation outcome as a plain boolean.
    pub fn set_result(&mut self, value: bool) {
        self.outcome = Some(value);
    }

    /// Fail the evaluation and attach a validation explaining why.
    ///
    /// May be called repeatedly; entries accumulate in call order.
    pub fn fail_with_validation(&mut self, entry: Validation) {
        self.outcome = Some(false);
        self.validations.push(entry);
    }

    /// Collapse the sink into a result, or `None` if nothing was reported.
    pub fn finish(self) -> Option<RuleResult> {
        if !self.validations.is_empty() {
            return Some(RuleResult::FailWithValidations(self.validations));
        }
        self.outcome.map(|value| {
            if value {
                RuleResult::Pass
            } else {
                RuleResult::Fail
            }
        })
    }
}
