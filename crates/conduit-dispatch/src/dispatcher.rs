//! Agent dispatcher: resolve, build prompt, select model, dispatch, record cost.

use crate::error::DispatchError;
use crate::prompt::{build_messages, build_request, DEFAULT_EXAMPLE_MAX_LEN};
use crate::select::select_model;
use crate::types::{DispatchConstraints, DispatchContext, DispatchOutcome};
use conduit_complexity::estimate as estimate_complexity;
use conduit_pricing::tracker::{CostTracker, RecordInput};
use conduit_providers::{FallbackChain, ProviderError, ProviderRegistry};
use conduit_types::agent::AgentCatalog;
use conduit_types::TokenUsage;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

pub struct AgentDispatcher {
    catalog: Arc<dyn AgentCatalog>,
    registry: Arc<ProviderRegistry>,
    tracker: Arc<CostTracker>,
    example_max_len: usize,
}

impl AgentDispatcher {
    pub fn new(catalog: Arc<dyn AgentCatalog>, registry: Arc<ProviderRegistry>, tracker: Arc<CostTracker>) -> Self {
        Self {
            catalog,
            registry,
            tracker,
            example_max_len: DEFAULT_EXAMPLE_MAX_LEN,
        }
    }

    pub fn with_example_max_len(mut self, max_len: usize) -> Self {
        self.example_max_len = max_len;
        self
    }

    pub fn catalog(&self) -> &Arc<dyn AgentCatalog> {
        &self.catalog
    }

    /// Estimate input tokens from prompt character length (~4 chars/token)
    /// when the provider does not report usage.
    fn estimate_tokens(prompt_chars: usize, response_chars: usize) -> TokenUsage {
        let input = (prompt_chars as u64).div_ceil(4);
        let output = (response_chars as u64).div_ceil(4);
        TokenUsage::new(input, output)
    }

    #[instrument(skip(self, context, constraints, stream_sink, cancel), fields(agent_id = %agent_id))]
    pub async fn dispatch(
        &self,
        agent_id: &str,
        task: &str,
        context: DispatchContext,
        constraints: DispatchConstraints,
        stream_sink: Option<Sender<String>>,
        cancel: CancellationToken,
    ) -> Result<DispatchOutcome, DispatchError> {
        let agent = self
            .catalog
            .get(agent_id)
            .ok_or_else(|| DispatchError::AgentNotFound(agent_id.to_string()))?;

        if !agent.routing.has_candidates_or_default() {
            return Err(DispatchError::InvalidConfig(agent_id.to_string()));
        }

        let messages = build_messages(&agent, task, &context.values, &constraints, self.example_max_len);
        let prompt_chars: usize = messages.iter().map(|m| m.content.len()).sum();
        let assembled_prompt = messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n");

        let complexity = estimate_complexity(
            task,
            &assembled_prompt,
            agent.routing.policy.as_ref(),
            constraints.complexity_override,
        );
        let first_choice = select_model(&agent.routing, &constraints, complexity);
        let fallback_chain = agent.routing.fallback_chain(&first_choice);

        let request = build_request(&agent, first_choice.clone(), messages);

        let chain = FallbackChain::new(&self.registry, &fallback_chain);
        let started = std::time::Instant::now();

        let call = async {
            match stream_sink {
                Some(sink) => chain.chat_stream(request, sink, cancel.clone()).await,
                None => chain.chat(request, cancel.clone()).await,
            }
        };

        let result = tokio::time::timeout(agent.routing.timeout, call).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let outcome = match result {
            Err(_elapsed) => Err(DispatchError::Timeout(agent_id.to_string())),
            Ok(Err(ProviderError::Cancelled)) => Err(DispatchError::Cancelled),
            Ok(Err(err)) => Err(DispatchError::ProviderExhausted {
                agent_id: agent_id.to_string(),
                last_error: err.to_string(),
            }),
            Ok(Ok(outcome)) => {
                let (provider, model) = conduit_providers::split_candidate(&outcome.served_by);
                let tokens = outcome
                    .response
                    .usage
                    .map(|u| TokenUsage::new(u.input, u.output))
                    .unwrap_or_else(|| Self::estimate_tokens(prompt_chars, outcome.response.content.len()));

                self.tracker.record(RecordInput {
                    agent_id: agent_id.to_string(),
                    guild: agent.guild.clone(),
                    provider: provider.clone(),
                    model: model.clone(),
                    task: task.to_string(),
                    tokens,
                    duration_ms,
                    success: true,
                });

                Ok(DispatchOutcome {
                    output: outcome.response.content,
                    duration_ms,
                    tokens: Some(tokens),
                    model_used: model,
                    provider,
                })
            }
        };

        if let Err(ref err) = outcome {
            let (provider, model) = first_choice
                .split_once(':')
                .map(|(p, m)| (p.to_string(), m.to_string()))
                .unwrap_or(("ollama".to_string(), first_choice.clone()));
            self.tracker.record(RecordInput {
                agent_id: agent_id.to_string(),
                guild: agent.guild.clone(),
                provider,
                model,
                task: task.to_string(),
                tokens: TokenUsage::new(0, 0),
                duration_ms,
                success: false,
            });
            tracing::warn!(error = %err, "agent dispatch failed");
        }

        outcome
    }
}
