//! Cost entry and pricing data model (C1/C2).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
    pub total: u64,
}

impl TokenUsage {
    pub fn new(input: u64, output: u64) -> Self {
        Self {
            input,
            output,
            total: input + output,
        }
    }
}

/// Per-1K-token USD pricing for a (provider, model) pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PricingEntry {
    pub input_per_1k_usd: f64,
    pub output_per_1k_usd: f64,
}

impl PricingEntry {
    pub const fn new(input_per_1k_usd: f64, output_per_1k_usd: f64) -> Self {
        Self {
            input_per_1k_usd,
            output_per_1k_usd,
        }
    }

    pub const fn free() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn cost_usd(&self, tokens: TokenUsage) -> f64 {
        (tokens.input as f64 / 1000.0) * self.input_per_1k_usd
            + (tokens.output as f64 / 1000.0) * self.output_per_1k_usd
    }
}

/// An immutable record of a single agent dispatch's token usage and cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEntry {
    pub id: String,
    pub agent_id: String,
    pub guild: String,
    pub provider: String,
    pub model: String,
    pub task: String,
    pub tokens: TokenUsage,
    pub cost_usd: f64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub duration_ms: u64,
    pub success: bool,
}
