//! Fallback chain: tries an ordered list of `"provider:model"` candidates
//! in order, advancing to the next on failure and recording which
//! candidate ultimately served the call.

use crate::error::ProviderError;
use crate::provider::{split_candidate, ProviderRegistry};
use crate::retry::RetryPolicy;
use crate::types::{ChatRequest, ChatResponse};
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Outcome of a fallback-chain call: the response plus which candidate
/// (`"provider:model"`) actually produced it, so the caller can build an
/// accurate cost entry.
pub struct FallbackOutcome {
    pub response: ChatResponse,
    pub served_by: String,
}

pub struct FallbackChain<'a> {
    registry: &'a ProviderRegistry,
    candidates: &'a [String],
    retry: RetryPolicy,
}

impl<'a> FallbackChain<'a> {
    pub fn new(registry: &'a ProviderRegistry, candidates: &'a [String]) -> Self {
        Self {
            registry,
            candidates,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Non-streaming call: each candidate may be retried per `self.retry`
    /// before the chain advances.
    pub async fn chat(
        &self,
        mut request: ChatRequest,
        cancel: CancellationToken,
    ) -> Result<FallbackOutcome, ProviderError> {
        let mut last_error: Option<ProviderError> = None;
        for candidate in self.candidates {
            let (provider_name, model) = split_candidate(candidate);
            let Some(provider) = self.registry.get(&provider_name) else {
                last_error = Some(ProviderError::Upstream {
                    provider: provider_name.clone(),
                    message: "provider not registered".to_string(),
                });
                continue;
            };
            request.model = model;

            for attempt in 1..=self.retry.max_attempts {
                if cancel.is_cancelled() {
                    return Err(ProviderError::Cancelled);
                }
                if attempt > 1 {
                    tokio::time::sleep(self.retry.delay_for(attempt)).await;
                }
                match provider.chat(request.clone(), cancel.clone()).await {
                    Ok(response) => {
                        return Ok(FallbackOutcome {
                            response,
                            served_by: candidate.clone(),
                        })
                    }
                    Err(err) => {
                        warn!(candidate = %candidate, attempt, error = %err, "provider call failed");
                        last_error = Some(err);
                    }
                }
            }
        }
        Err(ProviderError::Exhausted {
            last_error: last_error.map(|e| e.to_string()).unwrap_or_else(|| "no candidates configured".to_string()),
        })
    }

    /// Streaming call. Per the single-attempt-only rule for streaming, no
    /// retry is attempted against a candidate once chunks may have already
    /// reached the caller — the chain advances to the next candidate only
    /// if the FIRST attempt on a candidate fails before any chunk was sent.
    pub async fn chat_stream(
        &self,
        mut request: ChatRequest,
        sink: Sender<String>,
        cancel: CancellationToken,
    ) -> Result<FallbackOutcome, ProviderError> {
        let mut last_error: Option<ProviderError> = None;
        for candidate in self.candidates {
            let (provider_name, model) = split_candidate(candidate);
            let Some(provider) = self.registry.get(&provider_name) else {
                last_error = Some(ProviderError::Upstream {
                    provider: provider_name.clone(),
                    message: "provider not registered".to_string(),
                });
                continue;
            };
            request.model = model;
            if cancel.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            match provider.chat_stream(request.clone(), sink.clone(), cancel.clone()).await {
                Ok(response) => {
                    return Ok(FallbackOutcome {
                        response,
                        served_by: candidate.clone(),
                    })
                }
                Err(err) => {
                    warn!(candidate = %candidate, error = %err, "streaming provider call failed before completion");
                    last_error = Some(err);
                }
            }
        }
        Err(ProviderError::Exhausted {
            last_error: last_error.map(|e| e.to_string()).unwrap_or_else(|| "no candidates configured".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn falls_back_to_second_candidate_on_failure() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockProvider::failing("openai")));
        registry.register(Arc::new(MockProvider::succeeding("ollama", "hi there")));

        let candidates = vec!["openai:gpt-4o".to_string(), "ollama:llama3".to_string()];
        let chain = FallbackChain::new(&registry, &candidates);
        let request = ChatRequest {
            model: "placeholder".into(),
            messages: vec![],
            temperature: 0.2,
            max_tokens: 100,
            stream: false,
        };
        let outcome = chain.chat(request, CancellationToken::new()).await.unwrap();
        assert_eq!(outcome.served_by, "ollama:llama3");
        assert_eq!(outcome.response.content, "hi there");
    }

    #[tokio::test]
    async fn exhausts_when_every_candidate_fails() {
        let mut registry = ProviderRegistry::new();
        registry.register(Arc::new(MockProvider::failing("openai")));
        let candidates = vec!["openai:gpt-4o".to_string()];
        let chain = FallbackChain::new(&registry, &candidates);
        let request = ChatRequest {
            model: "placeholder".into(),
            messages: vec![],
            temperature: 0.2,
            max_tokens: 100,
            stream: false,
        };
        let result = chain.chat(request, CancellationToken::new()).await;
        assert!(matches!(result, Err(ProviderError::Exhausted { .. })));
    }
}
