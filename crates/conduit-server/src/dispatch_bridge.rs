//! Bridges the Plan Executor's narrow [`conduit_executor::StepDispatch`]
//! capability onto the full [`conduit_dispatch::AgentDispatcher`], the seam
//! between C7 and C5.

use async_trait::async_trait;
use conduit_dispatch::{AgentDispatcher, DispatchConstraints, DispatchContext};
use conduit_executor::{StepDispatch, StepOutcome};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct ExecutorDispatch {
    dispatcher: Arc<AgentDispatcher>,
}

impl ExecutorDispatch {
    pub fn new(dispatcher: Arc<AgentDispatcher>) -> Self {
        Self { dispatcher }
    }
}

#[async_trait]
impl StepDispatch for ExecutorDispatch {
    async fn dispatch(&self, agent_id: &str, task: &str, cancel: CancellationToken) -> Result<StepOutcome, String> {
        self.dispatcher
            .dispatch(agent_id, task, DispatchContext::default(), DispatchConstraints::default(), None, cancel)
            .await
            .map(|outcome| StepOutcome {
                output: outcome.output,
                duration_ms: outcome.duration_ms,
            })
            .map_err(|err| err.to_string())
    }
}
