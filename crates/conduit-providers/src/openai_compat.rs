//! A concrete `ProviderClient` speaking the OpenAI chat-completions wire
//! format, which Ollama, Azure OpenAI, and most self-hosted inference
//! servers also implement. The proxy is intentionally transparent about
//! anything beyond chat messages/usage — it doesn't chase every vendor
//! extension.

use crate::error::ProviderError;
use crate::provider::ProviderClient;
use crate::types::{ChatRequest, ChatResponse, Usage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: Option<String>,
    client: Client,
}

impl OpenAiCompatProvider {
    pub fn new(name: impl Into<String>, base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to build reqwest client");

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client,
        }
    }

    fn request_body(&self, req: &ChatRequest) -> WireRequest {
        WireRequest {
            model: req.model.clone(),
            messages: req
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: match m.role {
                        crate::types::Role::System => "system",
                        crate::types::Role::User => "user",
                        crate::types::Role::Assistant => "assistant",
                    }
                    .to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: req.temperature,
            max_tokens: req.max_tokens,
            stream: req.stream,
        }
    }
}

#[derive(Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Deserialize)]
struct WireChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct WireUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
    total_tokens: u64,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[async_trait]
impl ProviderClient for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self, request, cancel), fields(provider = %self.name, model = %request.model))]
    async fn chat(&self, request: ChatRequest, cancel: CancellationToken) -> Result<ChatResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(url = %url, "forwarding chat request to OpenAI-compatible endpoint");

        let mut builder = self.client.post(&url).json(&self.request_body(&request));
        if let Some(key) = &self.api_key {
            builder = builder.header("authorization", format!("Bearer {key}"));
        }

        let send = builder.send();
        let response = tokio::select! {
            result = send => result.map_err(|e| ProviderError::Network {
                provider: self.name.clone(),
                message: e.to_string(),
            })?,
            _ = cancel.cancelled() => return Err(ProviderError::Cancelled),
        };

        let status = response.status();
        if status.as_u16() >= 500 {
            return Err(ProviderError::Upstream {
                provider: self.name.clone(),
                message: format!("status {status}"),
            });
        }

        let wire: WireResponse = response.json().await.map_err(|e| ProviderError::Upstream {
            provider: self.name.clone(),
            message: format!("malformed response body: {e}"),
        })?;

        let content = wire
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        Ok(ChatResponse {
            content,
            model: request.model,
            usage: wire.usage.map(|u| Usage {
                input: u.prompt_tokens,
                output: u.completion_tokens,
                total: u.total_tokens,
            }),
        })
    }

    /// Streaming is a concern of the surface layer rather than every
    /// upstream wire protocol; here we fetch the full completion, then
    /// replay it onto `sink` word-by-word so the rest of the pipeline
    /// (fallback, executor, surface) sees the same chunked shape a true
    /// SSE backend would produce.
    async fn chat_stream(
        &self,
        request: ChatRequest,
        sink: Sender<String>,
        cancel: CancellationToken,
    ) -> Result<ChatResponse, ProviderError> {
        let response = self.chat(request, cancel.clone()).await?;
        for word in response.content.split_inclusive(' ') {
            if cancel.is_cancelled() {
                return Err(ProviderError::Cancelled);
            }
            sink.send(word.to_string()).await.map_err(|_| ProviderError::Cancelled)?;
        }
        Ok(response)
    }
}
