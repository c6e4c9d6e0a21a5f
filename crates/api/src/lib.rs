//! `api` crate — HTTP layer over the workflow engine.
//!
//! Exposes:
//!   POST /api/v1/chat — run the message-moderation workflow against the
//!   posted message; `200 OK` with the validation list when the run
//!   resolves, `409 Conflict` with the same payload when it does not.

pub mod handlers;

use std::sync::Arc;

use axum::{routing::post, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use engine::WorkflowGraph;

use crate::handlers::chat::{self, MessagePost};

/// Shared application state: the prebuilt, immutable workflow graphs.
///
/// Graphs are constructed once and shared across requests — every request
/// gets its own run (scope, trace, collector) over the same tree.
#[derive(Clone)]
pub struct AppState {
    pub moderation: Arc<WorkflowGraph<MessagePost>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            moderation: Arc::new(chat::moderation_graph()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/chat", post(chat::post_message))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(bind: &str) -> anyhow::Result<()> {
    let app = router(AppState::new());
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("API listening on {bind}");
    axum::serve(listener, app).await?;
    Ok(())
}
