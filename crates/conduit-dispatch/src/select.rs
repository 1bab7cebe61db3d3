//! Model selection: override precedence, complexity-routed fallback.

use crate::types::{DispatchConstraints, RoutingPreference};
use conduit_complexity::Complexity;
use conduit_types::agent::RoutingConfig;

/// Pick the first-choice model for this dispatch. Caller override wins
/// unconditionally; then an explicit local/remote preference; then
/// complexity-based routing; the agent's configured default is always the
/// final fallback.
pub fn select_model(routing: &RoutingConfig, constraints: &DispatchConstraints, complexity: Complexity) -> String {
    if let Some(model) = &constraints.routing.model {
        return model.clone();
    }

    if let Some(preference) = constraints.routing.preference {
        let candidates = match preference {
            RoutingPreference::Local => &routing.local_candidates,
            RoutingPreference::Remote => &routing.remote_candidates,
        };
        if let Some(first) = candidates.first() {
            return first.clone();
        }
    }

    match complexity {
        Complexity::Low if !routing.local_candidates.is_empty() => routing.local_candidates[0].clone(),
        Complexity::High if !routing.remote_candidates.is_empty() => routing.remote_candidates[0].clone(),
        _ => routing.default_model.clone(),
    }
}
