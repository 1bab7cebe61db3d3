use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ProviderError {
    #[error("provider '{provider}' network error: {message}")]
    Network { provider: String, message: String },

    #[error("provider '{provider}' returned an error status: {message}")]
    Upstream { provider: String, message: String },

    #[error("provider '{provider}' request timed out")]
    Timeout { provider: String },

    #[error("dispatch was cancelled")]
    Cancelled,

    #[error("every model in the fallback chain failed; last error: {last_error}")]
    Exhausted { last_error: String },
}
