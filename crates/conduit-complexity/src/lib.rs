//! Complexity estimator — heuristic low/medium/high classifier used
//! to pick between an agent's local and remote model candidates.

use conduit_types::agent::RoutingPolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

const DEFAULT_LOW_WORD_MAX: usize = 80;
const DEFAULT_HIGH_WORD_MIN: usize = 300;

const HIGH_KEYWORDS: &[&str] = &[
    "design",
    "architecture",
    "rewrite",
    "refactor",
    "end-to-end",
    "full",
    "spec",
];

const LOW_KEYWORDS: &[&str] = &["typo", "rename", "format", "lint", "small", "quick"];

/// Classify task complexity, in order: explicit override, then
/// keyword/word-count heuristics.
pub fn estimate(
    task: &str,
    prompt: &str,
    policy: Option<&RoutingPolicy>,
    override_complexity: Option<Complexity>,
) -> Complexity {
    if let Some(c) = override_complexity {
        return c;
    }

    let combined = format!("{task}\n{prompt}").to_lowercase();
    let words: Vec<&str> = combined.split_whitespace().collect();
    let word_count = words.len();
    let token_estimate = combined.chars().count().div_ceil(4);

    let low_max = policy.and_then(|p| p.low_word_max).unwrap_or(DEFAULT_LOW_WORD_MAX);
    let high_min = policy
        .and_then(|p| p.high_word_min)
        .unwrap_or(DEFAULT_HIGH_WORD_MIN);

    let hi_hit = HIGH_KEYWORDS.iter().any(|kw| combined.contains(kw))
        || policy
            .map(|p| p.prefer_remote_keywords.iter().any(|kw| combined.contains(kw.as_str())))
            .unwrap_or(false);

    let lo_hit = LOW_KEYWORDS.iter().any(|kw| combined.contains(kw))
        || policy
            .map(|p| p.prefer_local_keywords.iter().any(|kw| combined.contains(kw.as_str())))
            .unwrap_or(false);

    if hi_hit || word_count > high_min || (token_estimate as f64) > 0.8 * high_min as f64 {
        Complexity::High
    } else if lo_hit || word_count < low_max {
        Complexity::Low
    } else {
        Complexity::Medium
    }
}
