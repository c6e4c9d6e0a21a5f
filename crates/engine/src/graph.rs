//! The executable workflow graph.
//!
//! A graph is a tree of tagged node variants built once and shared immutably
//! across concurrent runs. Branch ownership (boxed children) makes cycles
//! unrepresentable, so every path from the root reaches a `Terminal` within
//! the tree depth.

use std::sync::Arc;

use contracts::{Action, RuleEvaluator};

/// One node of the workflow tree.
pub enum WorkflowNode<M> {
    /// Evaluate a rule, then descend into `then_branch` on pass or
    /// `else_branch` on fail. An absent else-branch is traversed as
    /// `Terminal`.
    Condition {
        evaluator: Arc<dyn RuleEvaluator<M>>,
        then_branch: Box<WorkflowNode<M>>,
        else_branch: Option<Box<WorkflowNode<M>>>,
    },
    /// Execute an action, then descend into `next` regardless of its
    /// completion flag.
    ActionStep {
        action: Arc<dyn Action<M>>,
        next: Box<WorkflowNode<M>>,
    },
    /// End of this path.
    Terminal,
}

impl<M> WorkflowNode<M> {
    pub fn terminal() -> Self {
        WorkflowNode::Terminal
    }

    pub fn condition(evaluator: impl RuleEvaluator<M> + 'static, then_branch: Self) -> Self {
        WorkflowNode::Condition {
            evaluator: Arc::new(evaluator),
            then_branch: Box::new(then_branch),
            else_branch: None,
        }
    }

    pub fn condition_else(
        evaluator: impl RuleEvaluator<M> + 'static,
        then_branch: Self,
        else_branch: Self,
    ) -> Self {
        WorkflowNode::Condition {
            evaluator: Arc::new(evaluator),
            then_branch: Box::new(then_branch),
            else_branch: Some(Box::new(else_branch)),
        }
    }

    pub fn action(action: impl Action<M> + 'static, next: Self) -> Self {
        WorkflowNode::ActionStep {
            action: Arc::new(action),
            next: Box::new(next),
        }
    }

    /// Longest path (in node visits) from this node to a `Terminal`.
    pub fn depth(&self) -> usize {
        match self {
            WorkflowNode::Terminal => 0,
            WorkflowNode::ActionStep { next, .. } => 1 + next.depth(),
            WorkflowNode::Condition {
                then_branch,
                else_branch,
                ..
            } => {
                let else_depth = else_branch.as_ref().map_or(0, |b| b.depth());
                1 + then_branch.depth().max(else_depth)
            }
        }
    }
}

/// An immutable workflow definition, keyed by id and shareable across runs.
pub struct WorkflowGraph<M> {
    id: String,
    root: WorkflowNode<M>,
}

impl<M> WorkflowGraph<M> {
    pub fn new(id: impl Into<String>, root: WorkflowNode<M>) -> Self {
        Self {
            id: id.into(),
            root,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn root(&self) -> &WorkflowNode<M> {
        &self.root
    }

    /// Upper bound on node visits for any run of this graph.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}
