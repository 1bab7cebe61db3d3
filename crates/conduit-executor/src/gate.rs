//! Conditional gate evaluation.

use conduit_types::plan::{Condition, ConditionOperator, Plan, StepStatus};

pub enum GateDecision {
    Pass,
    Skip,
}

/// Resolves `condition.target` (a literal step id, or the `"previous"`
/// sentinel) and evaluates the gate against that target step's recorded
/// result. `"previous"` resolves via `condition.previous_step`, the
/// predecessor id the compiler pinned at compile time when phase order was
/// still known. `step_dependencies` is only an unordered fallback, correct
/// only when the step has a single dependency; conditions built outside the
/// compiler (tests, or plans assembled by hand) rely on that fallback.
pub fn evaluate(plan: &Plan, step_dependencies: &std::collections::BTreeSet<String>, condition: &Condition) -> GateDecision {
    let target_id = if condition.target == Condition::PREVIOUS {
        let resolved = condition
            .previous_step
            .clone()
            .or_else(|| step_dependencies.iter().max().cloned());
        match resolved {
            Some(id) => id,
            None => return GateDecision::Skip,
        }
    } else {
        condition.target.clone()
    };

    let Some(target) = plan.step(&target_id) else {
        return GateDecision::Skip;
    };
    let Some(result) = &target.result else {
        return GateDecision::Skip;
    };

    let passes = match condition.operator {
        ConditionOperator::IfSuccess => target.status == StepStatus::Completed,
        ConditionOperator::IfFailure => target.status == StepStatus::Failed,
        ConditionOperator::IfContains => condition
            .value
            .as_deref()
            .map(|v| result.output.contains(v))
            .unwrap_or(false),
    };

    if passes {
        GateDecision::Pass
    } else {
        GateDecision::Skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_types::plan::{PlanMetadata, PlanStatus, Step, StepResult};
    use std::collections::BTreeSet;

    fn plan_with_target(target_status: StepStatus, output: &str) -> Plan {
        Plan {
            id: "p1".into(),
            description: "d".into(),
            created_at: chrono::Utc::now(),
            status: PlanStatus::Running,
            steps: vec![Step {
                id: "s1".into(),
                agent_id: "svc".into(),
                task: "analyze".into(),
                dependencies: BTreeSet::new(),
                condition: None,
                status: target_status,
                result: Some(StepResult {
                    output: output.into(),
                    error: None,
                    duration_ms: 10,
                    started_at: chrono::Utc::now(),
                    completed_at: chrono::Utc::now(),
                }),
            }],
            metadata: PlanMetadata {
                total_steps: 1,
                parallel_batches: 1,
                estimated_duration_secs: 2,
                original_text: String::new(),
            },
        }
    }

    #[test]
    fn if_success_passes_on_completed_target() {
        let plan = plan_with_target(StepStatus::Completed, "ok");
        let deps = BTreeSet::from(["s1".to_string()]);
        let condition = Condition {
            target: Condition::PREVIOUS.into(),
            operator: ConditionOperator::IfSuccess,
            value: None,
            previous_step: None,
        };
        assert!(matches!(evaluate(&plan, &deps, &condition), GateDecision::Pass));
    }

    #[test]
    fn if_success_skips_on_failed_target() {
        let plan = plan_with_target(StepStatus::Failed, "boom");
        let deps = BTreeSet::from(["s1".to_string()]);
        let condition = Condition {
            target: Condition::PREVIOUS.into(),
            operator: ConditionOperator::IfSuccess,
            value: None,
            previous_step: None,
        };
        assert!(matches!(evaluate(&plan, &deps, &condition), GateDecision::Skip));
    }

    #[test]
    fn if_contains_checks_substring() {
        let plan = plan_with_target(StepStatus::Completed, "ERROR 500 occurred");
        let deps = BTreeSet::from(["s1".to_string()]);
        let condition = Condition {
            target: Condition::PREVIOUS.into(),
            operator: ConditionOperator::IfContains,
            value: Some("ERROR".into()),
            previous_step: None,
        };
        assert!(matches!(evaluate(&plan, &deps, &condition), GateDecision::Pass));
    }

    #[test]
    fn missing_result_skips_the_gate() {
        let mut plan = plan_with_target(StepStatus::Completed, "ok");
        plan.steps[0].result = None;
        let deps = BTreeSet::from(["s1".to_string()]);
        let condition = Condition {
            target: Condition::PREVIOUS.into(),
            operator: ConditionOperator::IfSuccess,
            value: None,
            previous_step: None,
        };
        assert!(matches!(evaluate(&plan, &deps, &condition), GateDecision::Skip));
    }

    #[test]
    fn previous_step_wins_over_lexicographic_max_fallback() {
        // "a_zzz" would be picked by `deps.iter().max()`, but the compiler
        // recorded "a_aaa" as the actual last-completed dependency.
        let mut plan = plan_with_target(StepStatus::Failed, "boom");
        plan.steps[0].id = "a_zzz".into();
        plan.steps.push(Step {
            id: "a_aaa".into(),
            agent_id: "svc".into(),
            task: "lint".into(),
            dependencies: BTreeSet::new(),
            condition: None,
            status: StepStatus::Completed,
            result: Some(StepResult {
                output: "ok".into(),
                error: None,
                duration_ms: 5,
                started_at: chrono::Utc::now(),
                completed_at: chrono::Utc::now(),
            }),
        });
        let deps = BTreeSet::from(["a_zzz".to_string(), "a_aaa".to_string()]);
        let condition = Condition {
            target: Condition::PREVIOUS.into(),
            operator: ConditionOperator::IfSuccess,
            value: None,
            previous_step: Some("a_aaa".into()),
        };
        assert!(matches!(evaluate(&plan, &deps, &condition), GateDecision::Pass));
    }
}
