//! Canonical provider client trait.

use crate::error::ProviderError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

/// A single provider's chat endpoint. One request produces one response; the
/// streaming form emits chunks on `sink` and returns the assembled final
/// response (or an error) when the call resolves.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Provider name, e.g. `"openai"`, `"ollama"`, `"anthropic"`.
    fn name(&self) -> &str;

    async fn chat(&self, request: ChatRequest, cancel: CancellationToken) -> Result<ChatResponse, ProviderError>;

    /// Streaming chat: chunks are pushed onto `sink` as they arrive. The
    /// sender MUST block on a full channel rather than drop chunks
    /// (backpressure). Returns the final assembled response.
    async fn chat_stream(
        &self,
        request: ChatRequest,
        sink: Sender<String>,
        cancel: CancellationToken,
    ) -> Result<ChatResponse, ProviderError>;
}

/// Maps a `"provider:model"` candidate string to the `ProviderClient` that
/// serves it.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: std::collections::HashMap<String, std::sync::Arc<dyn ProviderClient>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: std::sync::Arc<dyn ProviderClient>) {
        self.providers.insert(provider.name().to_string(), provider);
    }

    pub fn get(&self, provider_name: &str) -> Option<std::sync::Arc<dyn ProviderClient>> {
        self.providers.get(provider_name).cloned()
    }
}

/// Splits a `"provider:model"` candidate into `(provider, model)`. Bare
/// model strings with no colon are assumed to be served by `"ollama"`
/// (the local, zero-cost provider).
pub fn split_candidate(candidate: &str) -> (String, String) {
    match candidate.split_once(':') {
        Some((provider, model)) => (provider.to_string(), model.to_string()),
        None => ("ollama".to_string(), candidate.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_candidate_with_provider_prefix() {
        assert_eq!(
            split_candidate("openai:gpt-4o"),
            ("openai".to_string(), "gpt-4o".to_string())
        );
    }

    #[test]
    fn split_candidate_without_prefix_defaults_to_ollama() {
        assert_eq!(
            split_candidate("llama3:8b"),
            ("ollama".to_string(), "llama3:8b".to_string())
        );
    }
}
