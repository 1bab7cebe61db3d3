//! Server-level error taxonomy and its HTTP mapping.

use axum::{Json, http::StatusCode, response::IntoResponse, response::Response};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("workflow text is not valid: {0}")]
    InvalidSyntax(String),

    #[error("agent '{0}' is not registered in the catalog")]
    AgentNotFound(String),

    #[error("agent '{0}' routing config is invalid")]
    InvalidConfig(String),

    #[error("every model in the fallback chain failed: {0}")]
    ProviderExhausted(String),

    #[error("dispatch for agent '{0}' timed out")]
    Timeout(String),

    #[error("operation was cancelled")]
    Cancelled,

    #[error("{0} not found")]
    NotFound(String),

    #[error("rate limit exceeded for client '{0}'")]
    RateLimitExceeded(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<conduit_compiler::CompileError> for ServerError {
    fn from(err: conduit_compiler::CompileError) -> Self {
        ServerError::InvalidSyntax(err.to_string())
    }
}

impl From<conduit_dispatch::DispatchError> for ServerError {
    fn from(err: conduit_dispatch::DispatchError) -> Self {
        match err {
            conduit_dispatch::DispatchError::AgentNotFound(id) => ServerError::AgentNotFound(id),
            conduit_dispatch::DispatchError::InvalidConfig(id) => ServerError::InvalidConfig(id),
            conduit_dispatch::DispatchError::ProviderExhausted { last_error, .. } => {
                ServerError::ProviderExhausted(last_error)
            }
            conduit_dispatch::DispatchError::Timeout(id) => ServerError::Timeout(id),
            conduit_dispatch::DispatchError::Cancelled => ServerError::Cancelled,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ServerError::InvalidSyntax(_) => (StatusCode::BAD_REQUEST, "INVALID_SYNTAX"),
            ServerError::AgentNotFound(_) => (StatusCode::NOT_FOUND, "AGENT_NOT_FOUND"),
            ServerError::InvalidConfig(_) => (StatusCode::BAD_REQUEST, "INVALID_CONFIG"),
            ServerError::ProviderExhausted(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_EXHAUSTED"),
            ServerError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
            ServerError::Cancelled => (StatusCode::CONFLICT, "CANCELLED"),
            ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ServerError::RateLimitExceeded(_) => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED"),
            ServerError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "INVALID_REQUEST"),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
