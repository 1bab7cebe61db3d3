//! `GET /health` — liveness probe.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "initialized": true,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "uptime_secs": state.uptime_secs(),
        })),
    )
}

/// `GET /ready` — readiness probe: confirms the agent catalog and plan
/// store are reachable before declaring ready.
pub async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let agent_count = state.catalog.list().len();
    let stored_plans = state.plans.len();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ready",
            "agents": agent_count,
            "stored_plans": stored_plans,
        })),
    )
}

pub fn router() -> axum::Router<AppState> {
    use axum::routing::get;
    axum::Router::new().route("/health", get(health)).route("/ready", get(ready))
}
