//! Cost tracker read surface: summary, by-agent, by-guild, and CSV export.

use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use conduit_pricing::{AggregateBucket, CostFilter, CostSummary};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CostSummaryQuery {
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub guild: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// `GET /costs/summary`.
pub async fn cost_summary(State(state): State<AppState>, Query(query): Query<CostSummaryQuery>) -> Json<CostSummary> {
    Json(state.tracker.summary(CostFilter {
        agent_id: query.agent_id,
        guild: query.guild,
        limit: query.limit,
        ..Default::default()
    }))
}

#[derive(Debug, Serialize)]
pub struct CostBreakdown {
    pub key: String,
    pub bucket: AggregateBucket,
}

/// `GET /costs/agents/{agentId}`.
pub async fn cost_by_agent(State(state): State<AppState>, Path(agent_id): Path<String>) -> Json<CostBreakdown> {
    let summary = state.tracker.summary(CostFilter {
        agent_id: Some(agent_id.clone()),
        ..Default::default()
    });
    let bucket = summary.by_agent.get(&agent_id).cloned().unwrap_or_default();
    Json(CostBreakdown { key: agent_id, bucket })
}

/// `GET /costs/guilds/{guild}`.
pub async fn cost_by_guild(State(state): State<AppState>, Path(guild): Path<String>) -> Json<CostBreakdown> {
    let summary = state.tracker.summary(CostFilter {
        guild: Some(guild.clone()),
        ..Default::default()
    });
    let bucket = summary.by_guild.get(&guild).cloned().unwrap_or_default();
    Json(CostBreakdown { key: guild, bucket })
}

/// `GET /costs/export` — `text/csv` with a fixed header row.
pub async fn export_costs(State(state): State<AppState>) -> Response {
    let csv = state.tracker.export_csv();
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        csv,
    )
        .into_response()
}

pub fn router() -> axum::Router<AppState> {
    use axum::routing::get;
    axum::Router::new()
        .route("/costs/summary", get(cost_summary))
        .route("/costs/agents/{agentId}", get(cost_by_agent))
        .route("/costs/guilds/{guild}", get(cost_by_guild))
        .route("/costs/export", get(export_costs))
}
