//! `GET /agents` — read-only agent catalog listing.

use crate::state::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

pub async fn list_agents(State(state): State<AppState>) -> impl IntoResponse {
    let agents = state.catalog.list();
    let total = agents.len();
    Json(json!({ "agents": agents, "total": total }))
}

pub fn router() -> axum::Router<AppState> {
    use axum::routing::get;
    axum::Router::new().route("/agents", get(list_agents))
}
