use conduit_types::plan::{Plan, StepStatus};
use conduit_types::stream::PlanProgress;

/// A progress sink is an ordinary listener callback — the executor is the
/// single writer producing these, so a plain boxed closure suffices.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, progress: PlanProgress);
}

impl<F: Fn(PlanProgress) + Send + Sync> ProgressSink for F {
    fn on_progress(&self, progress: PlanProgress) {
        self(progress)
    }
}

pub fn snapshot(plan: &Plan) -> PlanProgress {
    let current_step = plan
        .steps
        .iter()
        .position(|s| s.status == StepStatus::Running)
        .map(|idx| idx + 1)
        .unwrap_or(0);

    PlanProgress {
        plan_id: plan.id.clone(),
        current_step,
        total_steps: plan.steps.len(),
        completed_count: plan.steps.iter().filter(|s| s.status == StepStatus::Completed).count(),
        failed_count: plan.steps.iter().filter(|s| s.status == StepStatus::Failed).count(),
        skipped_count: plan.steps.iter().filter(|s| s.status == StepStatus::Skipped).count(),
        status: plan.status,
    }
}
