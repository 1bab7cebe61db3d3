//! Provider client: a uniform interface over concrete LLM backends,
//! an ordered fallback chain across them, and a retry policy applied
//! within a single candidate before the chain advances.

pub mod error;
pub mod fallback;
pub mod mock;
pub mod openai_compat;
pub mod provider;
pub mod retry;
pub mod types;

pub use error::ProviderError;
pub use fallback::{FallbackChain, FallbackOutcome};
pub use openai_compat::OpenAiCompatProvider;
pub use provider::{split_candidate, ProviderClient, ProviderRegistry};
pub use retry::{BackoffStrategy, RetryPolicy};
pub use types::{ChatMessage, ChatRequest, ChatResponse, ChatStreamItem, Role, Usage};
