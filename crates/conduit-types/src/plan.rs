//! Plan and Step data model — the output of the workflow compiler and
//! the unit of work for the plan executor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    IfSuccess,
    IfFailure,
    IfContains,
}

/// A conditional gate evaluated at step start. `target` is either a literal
/// step id or the sentinel `"previous"`, resolved at execution time to the
/// last dependency actually completed. Since a step's `dependencies` is an
/// unordered set, the sentinel can't be resolved from `dependencies` alone
/// once a step has more than one dependency (e.g. a step gated on a phase
/// that ran `test AND lint`) — the compiler records the concrete id of the
/// last task emitted in the preceding phase in `previous_step` so that
/// resolution is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub target: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: Option<String>,
    /// The literal step id `"previous"` resolves to, pinned at compile time.
    /// `None` only for conditions built outside the compiler (e.g. tests).
    #[serde(default)]
    pub previous_step: Option<String>,
}

impl Condition {
    pub const PREVIOUS: &'static str = "previous";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub output: String,
    #[serde(default)]
    pub error: Option<String>,
    pub duration_ms: u64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub id: String,
    pub agent_id: String,
    pub task: String,
    pub dependencies: BTreeSet<String>,
    #[serde(default)]
    pub condition: Option<Condition>,
    pub status: StepStatus,
    #[serde(default)]
    pub result: Option<StepResult>,
}

impl Step {
    /// A step failure is critical (halts the plan) iff it has no condition.
    pub fn is_critical(&self) -> bool {
        self.condition.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub total_steps: usize,
    pub parallel_batches: usize,
    pub estimated_duration_secs: u64,
    pub original_text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub id: String,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub status: PlanStatus,
    pub steps: Vec<Step>,
    pub metadata: PlanMetadata,
}

impl Plan {
    /// `depth(step) = 0` if its deps are empty, else `1 + max(depth(dep))`.
    /// Panics only if the step graph contains a dependency cycle, which is
    /// impossible by construction from the compiler (phases strictly
    /// totally-order batches).
    pub fn depth_of(&self, step_id: &str) -> usize {
        fn go(plan: &Plan, id: &str, stack: &mut Vec<String>) -> usize {
            if stack.iter().any(|s| s == id) {
                // Defensive: should be unreachable given compiler invariants.
                return 0;
            }
            let Some(step) = plan.steps.iter().find(|s| s.id == id) else {
                return 0;
            };
            if step.dependencies.is_empty() {
                return 0;
            }
            stack.push(id.to_string());
            let max_dep_depth = step
                .dependencies
                .iter()
                .map(|d| go(plan, d, stack))
                .max()
                .unwrap_or(0);
            stack.pop();
            1 + max_dep_depth
        }
        go(self, step_id, &mut Vec::new())
    }

    pub fn max_depth(&self) -> usize {
        self.steps
            .iter()
            .map(|s| self.depth_of(&s.id))
            .max()
            .unwrap_or(0)
    }

    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn step_mut(&mut self, id: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id == id)
    }

    /// Recompute `status`: `completed` iff every step is terminal and no
    /// critical step failed; `failed` iff any critical step failed;
    /// `running` otherwise (until explicitly cancelled).
    pub fn recompute_status(&mut self, cancelled: bool) {
        if cancelled {
            self.status = PlanStatus::Cancelled;
            return;
        }
        let any_critical_failed = self
            .steps
            .iter()
            .any(|s| s.status == StepStatus::Failed && s.is_critical());
        if any_critical_failed {
            self.status = PlanStatus::Failed;
            return;
        }
        let all_terminal = self.steps.iter().all(|s| {
            matches!(
                s.status,
                StepStatus::Completed | StepStatus::Failed | StepStatus::Skipped
            )
        });
        self.status = if all_terminal {
            PlanStatus::Completed
        } else {
            PlanStatus::Running
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn step(id: &str, deps: &[&str]) -> Step {
        Step {
            id: id.into(),
            agent_id: "svc".into(),
            task: "do it".into(),
            dependencies: deps.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            condition: None,
            status: StepStatus::Pending,
            result: None,
        }
    }

    #[test]
    fn depth_and_max_depth() {
        let plan = Plan {
            id: "p1".into(),
            description: "d".into(),
            created_at: chrono::Utc::now(),
            status: PlanStatus::Pending,
            steps: vec![
                step("s1", &[]),
                step("s2", &["s1"]),
                step("s3", &["s2"]),
            ],
            metadata: PlanMetadata {
                total_steps: 3,
                parallel_batches: 3,
                estimated_duration_secs: 6,
                original_text: String::new(),
            },
        };
        assert_eq!(plan.depth_of("s1"), 0);
        assert_eq!(plan.depth_of("s2"), 1);
        assert_eq!(plan.depth_of("s3"), 2);
        assert_eq!(plan.max_depth(), 2);
    }

    #[test]
    fn status_completed_requires_no_critical_failure() {
        let mut plan = Plan {
            id: "p1".into(),
            description: "d".into(),
            created_at: chrono::Utc::now(),
            status: PlanStatus::Running,
            steps: vec![step("s1", &[])],
            metadata: PlanMetadata {
                total_steps: 1,
                parallel_batches: 1,
                estimated_duration_secs: 2,
                original_text: String::new(),
            },
        };
        plan.steps[0].status = StepStatus::Completed;
        plan.recompute_status(false);
        assert_eq!(plan.status, PlanStatus::Completed);

        plan.steps[0].status = StepStatus::Failed;
        plan.recompute_status(false);
        assert_eq!(plan.status, PlanStatus::Failed);
    }

    #[test]
    fn non_critical_failure_does_not_fail_plan() {
        let mut plan = Plan {
            id: "p1".into(),
            description: "d".into(),
            created_at: chrono::Utc::now(),
            status: PlanStatus::Running,
            steps: vec![step("s1", &[])],
            metadata: PlanMetadata {
                total_steps: 1,
                parallel_batches: 1,
                estimated_duration_secs: 2,
                original_text: String::new(),
            },
        };
        plan.steps[0].condition = Some(Condition {
            target: Condition::PREVIOUS.into(),
            operator: ConditionOperator::IfSuccess,
            value: None,
            previous_step: None,
        });
        plan.steps[0].status = StepStatus::Failed;
        plan.recompute_status(false);
        assert_eq!(plan.status, PlanStatus::Completed);
    }

    #[test]
    fn cancelled_overrides_everything() {
        let mut plan = Plan {
            id: "p1".into(),
            description: "d".into(),
            created_at: chrono::Utc::now(),
            status: PlanStatus::Running,
            steps: vec![step("s1", &[])],
            metadata: PlanMetadata {
                total_steps: 1,
                parallel_batches: 1,
                estimated_duration_secs: 2,
                original_text: String::new(),
            },
        };
        plan.recompute_status(true);
        assert_eq!(plan.status, PlanStatus::Cancelled);
    }
}
