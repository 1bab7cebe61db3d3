use conduit_complexity::Complexity;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingPreference {
    Local,
    Remote,
}

/// Caller-supplied overrides for one dispatch: an explicit model wins
/// unconditionally; a preference picks the first candidate of that kind;
/// otherwise complexity routing decides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingOverride {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub preference: Option<RoutingPreference>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConstraints {
    #[serde(default)]
    pub routing: RoutingOverride,
    #[serde(default)]
    pub complexity_override: Option<Complexity>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchContext {
    #[serde(default)]
    pub values: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchOutcome {
    pub output: String,
    pub duration_ms: u64,
    pub tokens: Option<conduit_types::TokenUsage>,
    pub model_used: String,
    pub provider: String,
}
