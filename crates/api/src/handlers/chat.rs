//! Chat moderation endpoint.
//!
//! Runs the `postMessage` workflow against each posted message: a clean
//! message flows into the post action, a flagged one fails the rule with a
//! fatal validation and the run does not resolve.

use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::info;

use contracts::{Action, Definition, EngineScope, RuleEvaluator, RuleResultSink, Validation};
use engine::{Engine, WorkflowGraph, WorkflowNode};

use crate::AppState;

/// Model for one posted chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePost {
    pub user_name: String,
    pub message: String,
}

struct IsMessageCleanEvaluator;

#[async_trait]
impl RuleEvaluator<MessagePost> for IsMessageCleanEvaluator {
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

struct PostMessageAction;

#[async_trait]
impl Action<MessagePost> for PostMessageAction {
    fn definition(&self) -> Definition {
        Definition::new("postMessage", "Persists the user's message")
    }

    async fn execute(
        &self,
        scope: &EngineScope<MessagePost>,
        _cancel: &CancellationToken,
    ) -> anyhow::Result<bool> {
        // This is where the message would be persisted.
        let model = scope.model().await;
        info!(user = %model.user_name, "message accepted for posting");
        Ok(true)
    }
}

/// The moderation workflow: post the message only when it is clean.
pub fn moderation_graph() -> WorkflowGraph<MessagePost> {
    WorkflowGraph::new(
        "postMessage",
        WorkflowNode::condition(
            IsMessageCleanEvaluator,
            WorkflowNode::action(PostMessageAction, WorkflowNode::terminal()),
        ),
    )
}

pub async fn post_message(
    State(state): State<AppState>,
    Json(post): Json<MessagePost>,
) -> (StatusCode, Json<Vec<Validation>>) {
    let inspector = Engine::new()
        .start_with_graph(state.moderation.clone(), post)
        .execute_auto_finalize(CancellationToken::new())
        .await;

    let status = if inspector.resolved() {
        StatusCode::OK
    } else {
        StatusCode::CONFLICT
    };
    (status, Json(inspector.validations().to_vec()))
}
