//! Plan executor: batches steps by dependency depth, evaluates conditional
//! gates, enforces the critical-failure halt policy, observes cancellation,
//! and emits progress.

use crate::dispatch_trait::StepDispatch;
use crate::gate::{self, GateDecision};
use crate::progress::{snapshot, ProgressSink};
use conduit_types::plan::{Plan, PlanStatus, StepResult, StepStatus};
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

fn batches_by_depth(plan: &Plan) -> Vec<Vec<String>> {
    let max_depth = plan.max_depth();
    let mut batches: Vec<Vec<String>> = vec![Vec::new(); max_depth + 1];
    for step in &plan.steps {
        let depth = plan.depth_of(&step.id);
        batches[depth].push(step.id.clone());
    }
    batches
}

fn mark_remaining_pending_as_skipped(plan: &mut Plan) {
    for step in plan.steps.iter_mut() {
        if step.status == StepStatus::Pending {
            step.status = StepStatus::Skipped;
        }
    }
}

fn emit(progress: Option<&Arc<dyn ProgressSink>>, plan: &Plan) {
    if let Some(sink) = progress {
        sink.on_progress(snapshot(plan));
    }
}

/// Runs `plan` to a terminal state, mutating it in place and returning it.
/// `dispatch` is the caller-supplied agent dispatcher capability.
#[instrument(skip(plan, dispatch, progress, cancel), fields(plan_id = %plan.id))]
pub async fn execute(
    mut plan: Plan,
    dispatch: Arc<dyn StepDispatch>,
    progress: Option<Arc<dyn ProgressSink>>,
    cancel: CancellationToken,
) -> Plan {
    plan.status = PlanStatus::Running;
    emit(progress.as_ref(), &plan);

    let batches = batches_by_depth(&plan);

    for batch in batches {
        if cancel.is_cancelled() {
            mark_remaining_pending_as_skipped(&mut plan);
            plan.recompute_status(true);
            emit(progress.as_ref(), &plan);
            return plan;
        }

        let mut skip_ids = Vec::new();
        let mut running: FuturesUnordered<_> = FuturesUnordered::new();

        for step_id in &batch {
            let step = plan.step(step_id).expect("batch ids come from the plan");
            if let Some(condition) = step.condition.clone() {
                if matches!(gate::evaluate(&plan, &step.dependencies, &condition), GateDecision::Skip) {
                    skip_ids.push(step_id.clone());
                    continue;
                }
            }

            let agent_id = step.agent_id.clone();
            let task = step.task.clone();
            let id = step_id.clone();
            let dispatch = dispatch.clone();
            let cancel_inner = cancel.clone();
            running.push(async move {
                let started_at = chrono::Utc::now();
                let started_instant = std::time::Instant::now();
                let result = dispatch.dispatch(&agent_id, &task, cancel_inner).await;
                (id, started_at, started_instant.elapsed(), result)
            });
        }

        for id in &skip_ids {
            if let Some(step) = plan.step_mut(id) {
                step.status = StepStatus::Skipped;
            }
        }
        for step_id in &batch {
            if !skip_ids.contains(step_id) {
                if let Some(step) = plan.step_mut(step_id) {
                    step.status = StepStatus::Running;
                }
            }
        }
        emit(progress.as_ref(), &plan);

        while let Some((id, started_at, elapsed, result)) = running.next().await {
            let completed_at = chrono::Utc::now();
            let Some(step) = plan.step_mut(&id) else { continue };
            match result {
                Ok(outcome) => {
                    step.status = StepStatus::Completed;
                    step.result = Some(StepResult {
                        output: outcome.output,
                        error: None,
                        duration_ms: outcome.duration_ms,
                        started_at,
                        completed_at,
                    });
                }
                Err(message) => {
                    step.status = StepStatus::Failed;
                    step.result = Some(StepResult {
                        output: String::new(),
                        error: Some(message),
                        duration_ms: elapsed.as_millis() as u64,
                        started_at,
                        completed_at,
                    });
                }
            }
            emit(progress.as_ref(), &plan);
        }

        let critical_failure = batch
            .iter()
            .filter_map(|id| plan.step(id))
            .any(|s| s.status == StepStatus::Failed && s.is_critical());

        if critical_failure {
            mark_remaining_pending_as_skipped(&mut plan);
            plan.status = PlanStatus::Failed;
            emit(progress.as_ref(), &plan);
            return plan;
        }
    }

    plan.recompute_status(cancel.is_cancelled());
    emit(progress.as_ref(), &plan);
    plan
}
