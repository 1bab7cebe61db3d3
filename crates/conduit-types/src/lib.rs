//! Shared data model for the Conduit orchestration runtime.
//!
//! This crate is deliberately inert: no I/O, no async, just the types and
//! pure invariants every other crate builds on.

pub mod agent;
pub mod cost;
pub mod ids;
pub mod plan;
pub mod stream;

pub use agent::{Agent, AgentCatalog, FewShotExample, InMemoryAgentCatalog, RoutingConfig, RoutingPolicy};
pub use cost::{CostEntry, PricingEntry, TokenUsage};
pub use plan::{Condition, ConditionOperator, Plan, PlanMetadata, PlanStatus, Step, StepResult, StepStatus};
pub use stream::{PlanProgress, StreamEvent};
