//! The plan executor's view of the agent dispatcher: a narrow capability
//! trait (polymorphism over a capability, not a class hierarchy) so this
//! crate can be tested without depending on `conduit-dispatch` or a live
//! provider.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub output: String,
    pub duration_ms: u64,
}

#[async_trait]
pub trait StepDispatch: Send + Sync {
    /// Runs one step's dispatch. `Err` carries a human-readable message —
    /// the executor records it verbatim at `result.error`.
    async fn dispatch(&self, agent_id: &str, task: &str, cancel: CancellationToken) -> Result<StepOutcome, String>;
}
