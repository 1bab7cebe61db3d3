//! Pricing table — static map from (provider, model) to per-1K USD.

use conduit_types::PricingEntry;
use std::collections::HashMap;

/// Resolves pricing by provider/model, falling back through:
/// `"<provider>:<model>"` → `"<provider>"` → the `ollama` entry (free).
#[derive(Debug, Clone)]
pub struct PricingTable {
    entries: HashMap<String, PricingEntry>,
}

impl PricingTable {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// A representative set of current (at spec-writing time) published
    /// rates plus a free entry for local/ollama models.
    pub fn with_defaults() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            "openai:gpt-4".into(),
            PricingEntry::new(0.030, 0.060),
        );
        entries.insert(
            "openai:gpt-4o".into(),
            PricingEntry::new(0.0025, 0.010),
        );
        entries.insert(
            "openai:gpt-4o-mini".into(),
            PricingEntry::new(0.00015, 0.0006),
        );
        entries.insert(
            "openai:gpt-3.5-turbo".into(),
            PricingEntry::new(0.0005, 0.0015),
        );
        entries.insert(
            "anthropic:claude-3.5-sonnet".into(),
            PricingEntry::new(0.003, 0.015),
        );
        entries.insert(
            "anthropic:claude-3-haiku".into(),
            PricingEntry::new(0.00025, 0.00125),
        );
        entries.insert(
            "gemini:gemini-2.0-flash".into(),
            PricingEntry::new(0.0005, 0.0005),
        );
        entries.insert(
            "gemini:gemini-1.5-pro".into(),
            PricingEntry::new(0.00125, 0.005),
        );
        // Provider-level fallback for anything not matched by an exact model key.
        entries.insert("openai".into(), PricingEntry::new(0.0025, 0.010));
        entries.insert("anthropic".into(), PricingEntry::new(0.003, 0.015));
        entries.insert("gemini".into(), PricingEntry::new(0.0001, 0.0004));
        entries.insert("ollama".into(), PricingEntry::free());
        Self { entries }
    }

    pub fn set(&mut self, provider: impl Into<String>, model: impl Into<String>, pricing: PricingEntry) {
        let key = format!("{}:{}", provider.into().to_lowercase(), model.into().to_lowercase());
        self.entries.insert(key, pricing);
    }

    pub fn set_provider_default(&mut self, provider: impl Into<String>, pricing: PricingEntry) {
        self.entries.insert(provider.into().to_lowercase(), pricing);
    }

    /// Resolve pricing for `(provider, model)`. Always returns a value —
    /// the final fallback is a zero-cost entry for unknown/local providers.
    pub fn resolve(&self, provider: &str, model: &str) -> PricingEntry {
        let provider_lc = provider.to_lowercase();
        let model_lc = model.to_lowercase();

        let exact_key = format!("{provider_lc}:{model_lc}");
        if let Some(p) = self.entries.get(&exact_key) {
            return *p;
        }
        if let Some(p) = self.entries.get(&provider_lc) {
            return *p;
        }
        self.entries
            .get("ollama")
            .copied()
            .unwrap_or(PricingEntry::free())
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_key_wins_over_provider_default() {
        let table = PricingTable::with_defaults();
        let p = table.resolve("openai", "gpt-4o");
        assert!((p.input_per_1k_usd - 0.0025).abs() < 1e-9);
    }

    #[test]
    fn unknown_model_falls_back_to_provider() {
        let table = PricingTable::with_defaults();
        let p = table.resolve("openai", "gpt-5-unreleased");
        assert!((p.input_per_1k_usd - 0.0025).abs() < 1e-9);
    }

    #[test]
    fn unknown_provider_falls_back_to_ollama_free() {
        let table = PricingTable::with_defaults();
        let p = table.resolve("totally-unknown", "whatever");
        assert!((p.input_per_1k_usd).abs() < f64::EPSILON);
        assert!((p.output_per_1k_usd).abs() < f64::EPSILON);
    }

    #[test]
    fn case_insensitive_lookup() {
        let table = PricingTable::with_defaults();
        let p = table.resolve("OpenAI", "GPT-4O");
        assert!((p.input_per_1k_usd - 0.0025).abs() < 1e-9);
    }

    #[test]
    fn custom_override_takes_precedence() {
        let mut table = PricingTable::with_defaults();
        table.set("custom", "my-model", PricingEntry::new(1.0, 2.0));
        let p = table.resolve("custom", "my-model");
        assert!((p.input_per_1k_usd - 1.0).abs() < 1e-9);
    }
}
