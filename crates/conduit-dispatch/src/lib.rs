//! Agent dispatcher: resolves an agent, builds its prompt, selects a
//! model, invokes the provider fallback chain, and records cost — tying
//! together the agent catalog, complexity estimator, provider client, and
//! cost tracker.

pub mod dispatcher;
pub mod error;
pub mod prompt;
pub mod select;
pub mod types;

pub use dispatcher::AgentDispatcher;
pub use error::DispatchError;
pub use types::{DispatchConstraints, DispatchContext, DispatchOutcome, RoutingOverride, RoutingPreference};
