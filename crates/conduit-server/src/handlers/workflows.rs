//! DSL compilation and plan lifecycle endpoints: compile, execute, list,
//! fetch, and cancel.

use crate::dispatch_bridge::ExecutorDispatch;
use crate::error::{ServerError, ServerResult};
use crate::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use conduit_types::plan::{Plan, PlanStatus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Deserialize)]
pub struct CompileRequest {
    pub text: String,
    #[serde(default)]
    pub default_agent_id: Option<String>,
}

/// `POST /workflows/compile` — parse only; does not persist the plan.
pub async fn compile_workflow(Json(req): Json<CompileRequest>) -> ServerResult<impl IntoResponse> {
    let plan = conduit_compiler::compile(&req.text, req.default_agent_id.as_deref())?;
    Ok(Json(plan))
}

/// `POST /workflows/execute` — compiles, persists, runs to completion, and
/// persists the terminal plan. Registers a cancellation token for the
/// duration of the run so a concurrent `cancelPlan` request can reach it.
pub async fn execute_workflow(State(state): State<AppState>, Json(req): Json<CompileRequest>) -> ServerResult<impl IntoResponse> {
    let plan = conduit_compiler::compile(&req.text, req.default_agent_id.as_deref())?;
    state.plans.save(plan.clone());

    let cancel = CancellationToken::new();
    state.cancellations.insert(plan.id.clone(), cancel.clone());

    let dispatch: Arc<dyn conduit_executor::StepDispatch> = Arc::new(ExecutorDispatch::new(state.dispatcher.clone()));
    let terminal = conduit_executor::execute(plan, dispatch, None, cancel).await;

    state.cancellations.remove(&terminal.id);
    state.plans.save(terminal.clone());

    Ok(Json(terminal))
}

#[derive(Debug, Deserialize)]
pub struct ListPlansQuery {
    #[serde(default)]
    pub status: Option<String>,
}

fn parse_status(s: &str) -> Option<PlanStatus> {
    match s.to_lowercase().as_str() {
        "pending" => Some(PlanStatus::Pending),
        "running" => Some(PlanStatus::Running),
        "completed" => Some(PlanStatus::Completed),
        "failed" => Some(PlanStatus::Failed),
        "cancelled" | "canceled" => Some(PlanStatus::Cancelled),
        _ => None,
    }
}

/// `GET /plans?status=` — plans in descending `createdAt` order, optionally
/// filtered by status.
pub async fn list_plans(State(state): State<AppState>, Query(query): Query<ListPlansQuery>) -> ServerResult<impl IntoResponse> {
    let plans: Vec<Plan> = match query.status {
        Some(s) => {
            let status = parse_status(&s).ok_or_else(|| ServerError::InvalidRequest(format!("unknown plan status '{s}'")))?;
            state.plans.get_by_status(status)
        }
        None => state.plans.list(),
    };
    Ok(Json(plans))
}

/// `GET /plans/{planId}`.
pub async fn get_plan(State(state): State<AppState>, Path(plan_id): Path<String>) -> ServerResult<impl IntoResponse> {
    state
        .plans
        .get(&plan_id)
        .map(Json)
        .ok_or_else(|| ServerError::NotFound(format!("plan '{plan_id}'")))
}

#[derive(Debug, Serialize)]
pub struct CancelPlanResponse {
    pub success: bool,
    pub plan_id: String,
}

/// `POST /plans/{planId}/cancel` — raises the cancellation token for an
/// in-flight `executeWorkflow` run; a no-op (reported as `success: false`)
/// if the plan is not currently executing.
pub async fn cancel_plan(State(state): State<AppState>, Path(plan_id): Path<String>) -> impl IntoResponse {
    let success = match state.cancellations.get(&plan_id) {
        Some(token) => {
            token.cancel();
            true
        }
        None => false,
    };
    Json(CancelPlanResponse { success, plan_id })
}

pub fn router() -> axum::Router<AppState> {
    use axum::routing::{get, post};
    axum::Router::new()
        .route("/workflows/compile", post(compile_workflow))
        .route("/workflows/execute", post(execute_workflow))
        .route("/plans", get(list_plans))
        .route("/plans/{planId}", get(get_plan))
        .route("/plans/{planId}/cancel", post(cancel_plan))
}
