//! Deterministic mock provider used by dispatcher/executor tests so they
//! don't need a live HTTP endpoint.

use crate::error::ProviderError;
use crate::provider::ProviderClient;
use crate::types::{ChatRequest, ChatResponse, Usage};
use async_trait::async_trait;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;

pub struct MockProvider {
    name: String,
    behavior: MockBehavior,
}

enum MockBehavior {
    Succeed(String),
    Fail(String),
}

impl MockProvider {
    pub fn succeeding(name: impl Into<String>, reply: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behavior: MockBehavior::Succeed(reply.into()),
        }
    }

    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behavior: MockBehavior::Fail("mock provider configured to fail".to_string()),
        }
    }
}

#[async_trait]
impl ProviderClient for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, request: ChatRequest, _cancel: CancellationToken) -> Result<ChatResponse, ProviderError> {
        match &self.behavior {
            MockBehavior::Succeed(reply) => Ok(ChatResponse {
                content: reply.clone(),
                model: request.model,
                usage: Some(Usage {
                    input: 10,
                    output: 10,
                    total: 20,
                }),
            }),
            MockBehavior::Fail(message) => Err(ProviderError::Upstream {
                provider: self.name.clone(),
                message: message.clone(),
            }),
        }
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
        sink: Sender<String>,
        _cancel: CancellationToken,
    ) -> Result<ChatResponse, ProviderError> {
        match &self.behavior {
            MockBehavior::Succeed(reply) => {
                for word in reply.split_whitespace() {
                    sink.send(format!("{word} "))
                        .await
                        .map_err(|_| ProviderError::Cancelled)?;
                }
                Ok(ChatResponse {
                    content: reply.clone(),
                    model: request.model,
                    usage: Some(Usage {
                        input: 10,
                        output: 10,
                        total: 20,
                    }),
                })
            }
            MockBehavior::Fail(message) => Err(ProviderError::Upstream {
                provider: self.name.clone(),
                message: message.clone(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn succeeding_mock_echoes_configured_reply() {
        let provider = MockProvider::succeeding("ollama", "hello world");
        let request = ChatRequest {
            model: "llama3".into(),
            messages: vec![],
            temperature: 0.0,
            max_tokens: 10,
            stream: false,
        };
        let response = provider.chat(request, CancellationToken::new()).await.unwrap();
        assert_eq!(response.content, "hello world");
    }

    #[tokio::test]
    async fn failing_mock_returns_upstream_error() {
        let provider = MockProvider::failing("openai");
        let request = ChatRequest {
            model: "gpt-4o".into(),
            messages: vec![],
            temperature: 0.0,
            max_tokens: 10,
            stream: false,
        };
        let result = provider.chat(request, CancellationToken::new()).await;
        assert!(matches!(result, Err(ProviderError::Upstream { .. })));
    }
}
