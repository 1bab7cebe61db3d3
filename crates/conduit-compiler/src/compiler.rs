//! Workflow compiler: ties tokenizing, condition parsing, and agent
//! inheritance together into a typed [`Plan`].

use crate::condition::strip_condition;
use crate::error::CompileError;
use crate::tokenize::{split_agent_prefix, split_phases};
use conduit_types::ids;
use conduit_types::plan::{Plan, PlanMetadata, PlanStatus, Step, StepStatus};
use std::collections::BTreeSet;

/// Compiles DSL `text` into a pending [`Plan`]. `default_agent_id` seeds the
/// inherited agent at the start of every phase; tasks with no explicit
/// `agentId:` prefix and no default compile to an empty agent id, which the
/// executor will surface as `AgentNotFound` at dispatch time — an unknown or
/// missing agent is never a compile error.
pub fn compile(text: &str, default_agent_id: Option<&str>) -> Result<Plan, CompileError> {
    let phases = split_phases(text)?;
    let default_agent_id = default_agent_id.unwrap_or("");

    let mut steps: Vec<Step> = Vec::new();
    let mut previous_phase_ids: BTreeSet<String> = BTreeSet::new();
    // The id of the last task emitted in the preceding phase, in source
    // order. `dependencies` is a `BTreeSet` and forgets that order, so this
    // is carried separately and pinned onto any `"previous"` condition in
    // the phase about to be compiled.
    let mut previous_phase_last_id: Option<String> = None;
    let now_ms = || chrono::Utc::now().timestamp_millis() as u64;

    for phase in &phases {
        let mut current_agent = default_agent_id.to_string();
        let mut this_phase_ids: BTreeSet<String> = BTreeSet::new();
        let mut this_phase_last_id: Option<String> = None;

        for raw_token in phase {
            let (task_text, mut condition) = strip_condition(raw_token);
            let (explicit_agent, task_text) = split_agent_prefix(task_text.trim());
            if let Some(agent) = explicit_agent {
                current_agent = agent;
            }

            let id = ids::timestamped_id("step", now_ms());
            this_phase_ids.insert(id.clone());
            this_phase_last_id = Some(id.clone());

            if let Some(condition) = condition.as_mut() {
                if condition.target == conduit_types::plan::Condition::PREVIOUS {
                    condition.previous_step = previous_phase_last_id.clone();
                }
            }

            steps.push(Step {
                id,
                agent_id: current_agent.clone(),
                task: task_text,
                dependencies: previous_phase_ids.clone(),
                condition,
                status: StepStatus::Pending,
                result: None,
            });
        }

        previous_phase_ids = this_phase_ids;
        previous_phase_last_id = this_phase_last_id;
    }

    let total_steps = steps.len();
    let mut plan = Plan {
        id: ids::timestamped_id("plan", now_ms()),
        description: text.trim().to_string(),
        created_at: chrono::Utc::now(),
        status: PlanStatus::Pending,
        steps,
        metadata: PlanMetadata {
            total_steps,
            parallel_batches: 0,
            estimated_duration_secs: 0,
            original_text: text.to_string(),
        },
    };

    let parallel_batches = plan.max_depth() + 1;
    plan.metadata.parallel_batches = parallel_batches;
    plan.metadata.estimated_duration_secs = parallel_batches as u64 * 2;

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_types::plan::ConditionOperator;

    #[test]
    fn pure_sequential_scenario() {
        let plan = compile("build THEN test THEN deploy", Some("svc")).unwrap();
        assert_eq!(plan.steps.len(), 3);
        assert!(plan.steps.iter().all(|s| s.agent_id == "svc"));
        assert_eq!(plan.steps[1].dependencies, BTreeSet::from([plan.steps[0].id.clone()]));
        assert_eq!(plan.steps[2].dependencies, BTreeSet::from([plan.steps[1].id.clone()]));
        assert_eq!(plan.metadata.parallel_batches, 3);
    }

    #[test]
    fn pure_parallel_scenario() {
        let plan = compile("lint AND format AND typecheck", Some("svc")).unwrap();
        assert_eq!(plan.steps.len(), 3);
        assert!(plan.steps.iter().all(|s| s.dependencies.is_empty()));
        assert_eq!(plan.metadata.parallel_batches, 1);
    }

    #[test]
    fn mixed_with_conditional_scenario() {
        let plan = compile("svc: build THEN test AND lint THEN deploy IF success", Some("svc")).unwrap();
        assert_eq!(plan.steps.len(), 4);
        let build = &plan.steps[0];
        let test = &plan.steps[1];
        let lint = &plan.steps[2];
        let deploy = &plan.steps[3];
        assert_eq!(build.task, "build");
        assert!(test.dependencies.contains(&build.id));
        assert!(lint.dependencies.contains(&build.id));
        assert!(deploy.dependencies.contains(&test.id));
        assert!(deploy.dependencies.contains(&lint.id));
        assert_eq!(deploy.condition.as_ref().unwrap().operator, ConditionOperator::IfSuccess);
        // "deploy" depends on both test and lint; the sentinel must pin to
        // whichever of the two was emitted last, not the set's lexicographic max.
        assert_eq!(deploy.condition.as_ref().unwrap().previous_step.as_deref(), Some(lint.id.as_str()));
    }

    #[test]
    fn multi_agent_scenario() {
        let plan = compile(
            "websmith: build frontend THEN crafter: design review AND huntress: security scan",
            None,
        )
        .unwrap();
        assert_eq!(plan.steps[0].agent_id, "websmith");
        assert_eq!(plan.steps[1].agent_id, "crafter");
        assert_eq!(plan.steps[2].agent_id, "huntress");
        assert_eq!(plan.steps[1].dependencies, plan.steps[2].dependencies);
    }

    #[test]
    fn if_contains_scenario() {
        let plan = compile(r#"svc: analyze logs THEN svc: alert IF_CONTAINS("ERROR")"#, None).unwrap();
        let alert = &plan.steps[1];
        let condition = alert.condition.as_ref().unwrap();
        assert_eq!(condition.operator, ConditionOperator::IfContains);
        assert_eq!(condition.value.as_deref(), Some("ERROR"));
        assert_eq!(condition.target, "previous");
    }

    #[test]
    fn unknown_agent_is_not_a_compile_error() {
        let plan = compile("totally-unregistered-agent: do the thing", None);
        assert!(plan.is_ok());
    }

    #[test]
    fn empty_text_is_a_compile_error() {
        assert!(compile("   ", Some("svc")).is_err());
    }

    #[test]
    fn total_steps_matches_metadata() {
        let plan = compile("a THEN b AND c THEN d", Some("svc")).unwrap();
        assert_eq!(plan.metadata.total_steps, plan.steps.len());
        assert_eq!(plan.metadata.parallel_batches, 1 + plan.max_depth());
    }

    #[test]
    fn parallel_group_agent_inheritance_updates_within_group() {
        let plan = compile("build THEN websmith: review AND polish", Some("svc")).unwrap();
        // phase 1 has no explicit agent -> inherits default "svc"
        assert_eq!(plan.steps[0].agent_id, "svc");
        // phase 2: first task sets the group's current agent to websmith,
        // second task (no prefix) inherits it for the rest of the group.
        assert_eq!(plan.steps[1].agent_id, "websmith");
        assert_eq!(plan.steps[2].agent_id, "websmith");
    }

    #[test]
    fn each_phase_restarts_from_default_agent() {
        let plan = compile("svc: build THEN test", Some("svc")).unwrap();
        assert_eq!(plan.steps[0].agent_id, "svc");
        assert_eq!(plan.steps[1].agent_id, "svc");
    }
}
