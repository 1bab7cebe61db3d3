//! Single-task dispatch and per-agent cost history/stats.

use crate::error::{ServerError, ServerResult};
use crate::rate_limit::client_key;
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::IntoResponse,
};
use conduit_dispatch::{DispatchConstraints, DispatchContext};
use conduit_pricing::CostFilter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub agent_id: String,
    pub task: String,
    #[serde(default)]
    pub context: Value,
    #[serde(default)]
    pub constraints: DispatchConstraints,
}

#[derive(Debug, Serialize)]
pub struct TaskResult {
    pub agent_id: String,
    pub output: String,
    pub duration_ms: u64,
    pub tokens: Option<conduit_types::TokenUsage>,
    pub model_used: String,
    pub provider: String,
}

/// `POST /execute` — submit-and-wait single-task execution, rate-limited
/// per client.
pub async fn execute(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ExecuteRequest>,
) -> ServerResult<impl IntoResponse> {
    let client = client_key(&headers);
    if !state.rate_limiter.check(&client) {
        return Err(ServerError::RateLimitExceeded(client));
    }

    let outcome = state
        .dispatcher
        .dispatch(
            &req.agent_id,
            &req.task,
            DispatchContext { values: req.context },
            req.constraints,
            None,
            CancellationToken::new(),
        )
        .await?;

    Ok(Json(TaskResult {
        agent_id: req.agent_id,
        output: outcome.output,
        duration_ms: outcome.duration_ms,
        tokens: outcome.tokens,
        model_used: outcome.model_used,
        provider: outcome.provider,
    }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub limit: Option<usize>,
}

/// `GET /agents/{agentId}/history` — recent cost entries for one agent.
pub async fn history(
    State(state): State<AppState>,
    Path(agent_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let summary = state.tracker.summary(CostFilter {
        agent_id: Some(agent_id),
        limit: query.limit,
        ..Default::default()
    });
    Json(summary.recent)
}

#[derive(Debug, Serialize)]
pub struct AgentStats {
    pub agent_id: String,
    pub total_cost: f64,
    pub total_tasks: u64,
    pub avg_cost_per_task: f64,
    pub by_provider: std::collections::HashMap<String, conduit_pricing::AggregateBucket>,
}

/// `GET /agents/{agentId}/stats` — cost and usage rollup scoped to one agent.
pub async fn stats(State(state): State<AppState>, Path(agent_id): Path<String>) -> impl IntoResponse {
    let summary = state.tracker.summary(CostFilter {
        agent_id: Some(agent_id.clone()),
        limit: Some(0),
        ..Default::default()
    });
    Json(AgentStats {
        agent_id,
        total_cost: summary.total_cost,
        total_tasks: summary.total_tasks,
        avg_cost_per_task: summary.avg_cost_per_task,
        by_provider: summary.by_provider,
    })
}

pub fn router() -> axum::Router<AppState> {
    use axum::routing::{get, post};
    axum::Router::new()
        .route("/execute", post(execute))
        .route("/agents/{agentId}/history", get(history))
        .route("/agents/{agentId}/stats", get(stats))
}
