use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum DispatchError {
    #[error("agent '{0}' is not registered in the catalog")]
    AgentNotFound(String),

    #[error("agent '{0}' routing config has neither candidates nor a default model")]
    InvalidConfig(String),

    #[error("every model in the fallback chain for agent '{agent_id}' failed: {last_error}")]
    ProviderExhausted { agent_id: String, last_error: String },

    #[error("dispatch for agent '{0}' exceeded its timeout")]
    Timeout(String),

    #[error("dispatch was cancelled")]
    Cancelled,
}
