//! Cost tracker — append-only ring of cost entries with aggregation.

use crate::table::PricingTable;
use conduit_types::{CostEntry, TokenUsage, ids};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

const DEFAULT_MAX_ENTRIES: usize = 10_000;
const DEFAULT_SUMMARY_LIMIT: usize = 10;

/// Inputs for one recorded dispatch. `success = false` still produces an
/// entry, so that per-agent and per-guild aggregates always reflect total
/// spend regardless of outcome.
#[derive(Debug, Clone)]
pub struct RecordInput {
    pub agent_id: String,
    pub guild: String,
    pub provider: String,
    pub model: String,
    pub task: String,
    pub tokens: TokenUsage,
    pub duration_ms: u64,
    pub success: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CostFilter {
    pub agent_id: Option<String>,
    pub guild: Option<String>,
    pub start_time: Option<chrono::DateTime<chrono::Utc>>,
    pub end_time: Option<chrono::DateTime<chrono::Utc>>,
    pub limit: Option<usize>,
}

impl CostFilter {
    fn matches(&self, e: &CostEntry) -> bool {
        if let Some(id) = &self.agent_id {
            if &e.agent_id != id {
                return false;
            }
        }
        if let Some(g) = &self.guild {
            if &e.guild != g {
                return false;
            }
        }
        if let Some(start) = self.start_time {
            if e.timestamp < start {
                return false;
            }
        }
        if let Some(end) = self.end_time {
            if e.timestamp > end {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct AggregateBucket {
    pub cost: f64,
    pub tasks: u64,
    pub tokens: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct CostSummary {
    pub total_cost: f64,
    pub total_tasks: u64,
    pub avg_cost_per_task: f64,
    pub by_provider: HashMap<String, AggregateBucket>,
    pub by_agent: HashMap<String, AggregateBucket>,
    pub by_guild: HashMap<String, AggregateBucket>,
    pub recent: Vec<CostEntry>,
}

/// Thread-safe, bounded ring of cost entries. `record` and `summary` are
/// mutually exclusive via a reader-writer lock.
pub struct CostTracker {
    entries: RwLock<Vec<CostEntry>>,
    max_entries: usize,
    pricing: Arc<PricingTable>,
}

impl CostTracker {
    pub fn new(pricing: Arc<PricingTable>) -> Self {
        Self::with_capacity(pricing, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(pricing: Arc<PricingTable>, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            max_entries,
            pricing,
        }
    }

    /// Computes cost from the pricing table, assigns an id, timestamps now,
    /// and appends to the ring, evicting the oldest entry if over capacity.
    pub fn record(&self, input: RecordInput) -> CostEntry {
        let pricing = self.pricing.resolve(&input.provider, &input.model);
        let cost_usd = pricing.cost_usd(input.tokens);
        let now = chrono::Utc::now();
        let entry = CostEntry {
            id: ids::timestamped_id("cost", now.timestamp_millis() as u64),
            agent_id: input.agent_id,
            guild: input.guild,
            provider: input.provider,
            model: input.model,
            task: input.task,
            tokens: input.tokens,
            cost_usd,
            timestamp: now,
            duration_ms: input.duration_ms,
            success: input.success,
        };

        let mut entries = self.entries.write();
        entries.push(entry.clone());
        if entries.len() > self.max_entries {
            let overflow = entries.len() - self.max_entries;
            entries.drain(0..overflow);
        }
        tracing::debug!(
            agent_id = %entry.agent_id,
            provider = %entry.provider,
            model = %entry.model,
            cost_usd = entry.cost_usd,
            success = entry.success,
            "cost entry recorded"
        );
        entry
    }

    pub fn summary(&self, filter: CostFilter) -> CostSummary {
        let entries = self.entries.read();
        let matching: Vec<&CostEntry> = entries.iter().filter(|e| filter.matches(e)).collect();

        let total_cost: f64 = matching.iter().map(|e| e.cost_usd).sum();
        let total_tasks = matching.len() as u64;
        let avg_cost_per_task = if total_tasks == 0 {
            0.0
        } else {
            total_cost / total_tasks as f64
        };

        let mut by_provider: HashMap<String, AggregateBucket> = HashMap::new();
        let mut by_agent: HashMap<String, AggregateBucket> = HashMap::new();
        let mut by_guild: HashMap<String, AggregateBucket> = HashMap::new();
        for e in &matching {
            accumulate(&mut by_provider, &e.provider, e);
            accumulate(&mut by_agent, &e.agent_id, e);
            accumulate(&mut by_guild, &e.guild, e);
        }

        let limit = filter.limit.unwrap_or(DEFAULT_SUMMARY_LIMIT);
        let mut recent: Vec<CostEntry> = matching.iter().map(|e| (*e).clone()).collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        recent.truncate(limit);

        CostSummary {
            total_cost,
            total_tasks,
            avg_cost_per_task,
            by_provider,
            by_agent,
            by_guild,
            recent,
        }
    }

    /// `header,task` truncated to 50 chars, `cost` to 6 decimal places.
    pub fn export_csv(&self) -> String {
        let entries = self.entries.read();
        let mut out = String::from(
            "id,agentId,guild,provider,model,task,inputTokens,outputTokens,totalTokens,cost,duration,success\n",
        );
        for e in entries.iter() {
            let task: String = e.task.chars().take(50).collect();
            let task_escaped = task.replace('"', "\"\"");
            out.push_str(&format!(
                "{},{},{},{},{},\"{}\",{},{},{},{:.6},{},{}\n",
                e.id,
                e.agent_id,
                e.guild,
                e.provider,
                e.model,
                task_escaped,
                e.tokens.input,
                e.tokens.output,
                e.tokens.total,
                e.cost_usd,
                e.duration_ms,
                if e.success { "true" } else { "false" },
            ));
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn accumulate(map: &mut HashMap<String, AggregateBucket>, key: &str, e: &CostEntry) {
    let bucket = map.entry(key.to_string()).or_default();
    bucket.cost += e.cost_usd;
    bucket.tasks += 1;
    bucket.tokens += e.tokens.total;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> CostTracker {
        CostTracker::new(Arc::new(PricingTable::with_defaults()))
    }

    fn input(agent: &str, guild: &str, provider: &str, model: &str, in_tok: u64, out_tok: u64) -> RecordInput {
        RecordInput {
            agent_id: agent.into(),
            guild: guild.into(),
            provider: provider.into(),
            model: model.into(),
            task: "do the thing".into(),
            tokens: TokenUsage::new(in_tok, out_tok),
            duration_ms: 120,
            success: true,
        }
    }

    #[test]
    fn cost_aggregation_scenario_from_spec() {
        let t = tracker();
        t.record(input("a1", "eng", "openai", "gpt-4", 1000, 500));
        t.record(input("a2", "eng", "gemini", "gemini-2.0-flash", 2000, 2000));
        t.record(input("a3", "eng", "ollama", "llama3", 3000, 3000));

        let s = t.summary(CostFilter::default());
        assert!((s.total_cost - 0.062).abs() < 1e-9);
        assert!((s.by_provider["openai"].cost - 0.060).abs() < 1e-9);
        assert!((s.by_provider["gemini"].cost - 0.002).abs() < 1e-9);
        assert!((s.by_provider["ollama"].cost - 0.0).abs() < 1e-9);
        assert_eq!(s.total_tasks, 3);
    }

    #[test]
    fn zero_tokens_is_zero_cost() {
        let t = tracker();
        let e = t.record(input("a1", "eng", "openai", "gpt-4", 0, 0));
        assert!((e.cost_usd).abs() < f64::EPSILON);
    }

    #[test]
    fn avg_cost_is_zero_with_no_tasks() {
        let t = tracker();
        let s = t.summary(CostFilter::default());
        assert_eq!(s.total_tasks, 0);
        assert!((s.avg_cost_per_task).abs() < f64::EPSILON);
    }

    #[test]
    fn ring_eviction_keeps_most_recent() {
        let t = CostTracker::with_capacity(Arc::new(PricingTable::with_defaults()), 3);
        for i in 0..5 {
            t.record(input(&format!("a{i}"), "eng", "ollama", "llama3", 10, 10));
        }
        assert_eq!(t.len(), 3);
        let s = t.summary(CostFilter {
            limit: Some(10),
            ..Default::default()
        });
        let ids: Vec<&str> = s.recent.iter().map(|e| e.agent_id.as_str()).collect();
        assert!(ids.contains(&"a4"));
        assert!(ids.contains(&"a3"));
        assert!(ids.contains(&"a2"));
        assert!(!ids.contains(&"a0"));
    }

    #[test]
    fn failed_calls_are_still_recorded() {
        let t = tracker();
        let mut i = input("a1", "eng", "openai", "gpt-4", 100, 0);
        i.success = false;
        let e = t.record(i);
        assert!(!e.success);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn csv_export_header_and_truncation() {
        let t = tracker();
        let mut i = input("a1", "eng", "openai", "gpt-4", 100, 50);
        i.task = "x".repeat(80);
        t.record(i);
        let csv = t.export_csv();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,agentId,guild,provider,model,task,inputTokens,outputTokens,totalTokens,cost,duration,success"
        );
        let row = lines.next().unwrap();
        // 50 x's plus 2 wrapping quotes
        assert!(row.contains(&format!("\"{}\"", "x".repeat(50))));
    }

    #[test]
    fn filter_by_agent() {
        let t = tracker();
        t.record(input("a1", "eng", "openai", "gpt-4", 100, 50));
        t.record(input("a2", "eng", "openai", "gpt-4", 100, 50));
        let s = t.summary(CostFilter {
            agent_id: Some("a1".into()),
            ..Default::default()
        });
        assert_eq!(s.total_tasks, 1);
    }
}
