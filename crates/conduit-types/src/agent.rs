//! Read-only Agent data model.
//!
//! An [`Agent`] is a value, not an object with inherited behavior — routing
//! config plus a handful of optional prompt-shaping fields. The catalog that
//! holds these is assembled elsewhere (registry loading is out of scope for
//! this crate); this module only defines the shape callers consume.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A single named worker with a fixed routing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub title: String,
    /// Grouping label used for cost rollups and display; no behavioral effect.
    pub guild: String,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub kpis: Vec<String>,
    pub routing: RoutingConfig,
}

/// Per-agent model routing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Ordered local-first candidate models.
    #[serde(default)]
    pub local_candidates: Vec<String>,
    /// Ordered remote-fallback candidate models.
    #[serde(default)]
    pub remote_candidates: Vec<String>,
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout", with = "duration_secs")]
    pub timeout: Duration,
    #[serde(default)]
    pub policy: Option<RoutingPolicy>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub style_guidelines: Option<String>,
    #[serde(default)]
    pub examples: Vec<FewShotExample>,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_secs(u64::deserialize(d)?))
    }
}

/// Keyword/length hints nudging the complexity estimator (see `conduit-complexity`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoutingPolicy {
    #[serde(default)]
    pub low_word_max: Option<usize>,
    #[serde(default)]
    pub high_word_min: Option<usize>,
    #[serde(default)]
    pub prefer_local_keywords: Vec<String>,
    #[serde(default)]
    pub prefer_remote_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FewShotExample {
    pub user: String,
    pub assistant: String,
}

impl RoutingConfig {
    /// The ordered, de-duplicated fallback chain for a call that resolved to
    /// `first_choice`: the chosen model, then every remaining local
    /// candidate, then every remote candidate, preserving first-seen order.
    pub fn fallback_chain(&self, first_choice: &str) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut chain = Vec::new();
        let mut push = |model: &str, seen: &mut std::collections::HashSet<String>, chain: &mut Vec<String>| {
            if seen.insert(model.to_string()) {
                chain.push(model.to_string());
            }
        };
        push(first_choice, &mut seen, &mut chain);
        push(&self.default_model, &mut seen, &mut chain);
        for m in &self.local_candidates {
            push(m, &mut seen, &mut chain);
        }
        for m in &self.remote_candidates {
            push(m, &mut seen, &mut chain);
        }
        chain
    }

    pub fn has_candidates_or_default(&self) -> bool {
        !self.default_model.is_empty()
            || !self.local_candidates.is_empty()
            || !self.remote_candidates.is_empty()
    }
}

/// Read-only lookup of registered agents and their routing config.
///
/// Implementors are expected to be cheap to clone (e.g. an `Arc<HashMap<..>>`
/// wrapper) since the catalog is read-only after startup and needs no
/// locking for reads.
pub trait AgentCatalog: Send + Sync {
    fn get(&self, agent_id: &str) -> Option<Agent>;
    fn list(&self) -> Vec<Agent>;
}

/// An in-memory catalog built from an already-materialized agent list.
/// Loading agents from disk/YAML is out of scope — callers hand this a
/// `Vec<Agent>` assembled however they like.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAgentCatalog {
    agents: std::sync::Arc<std::collections::HashMap<String, Agent>>,
}

impl InMemoryAgentCatalog {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self {
            agents: std::sync::Arc::new(
                agents.into_iter().map(|a| (a.id.clone(), a)).collect(),
            ),
        }
    }
}

impl AgentCatalog for InMemoryAgentCatalog {
    fn get(&self, agent_id: &str) -> Option<Agent> {
        self.agents.get(agent_id).cloned()
    }

    fn list(&self) -> Vec<Agent> {
        self.agents.values().cloned().collect()
    }
}
