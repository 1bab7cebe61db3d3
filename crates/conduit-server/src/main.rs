//! Conduit orchestration runtime — entry point.
//!
//! Reads configuration from environment variables and starts the axum-based
//! REST + duplex WebSocket service. Agent registry loading from disk/YAML is
//! out of scope for the core; this binary materializes the catalog from an
//! inline env-var JSON blob (or a small built-in default set so the service
//! is runnable out of the box) and hands the core a plain `Vec<Agent>`.
//!
//! # Environment variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `CONDUIT_PORT` | `3000` | TCP port to listen on. |
//! | `CONDUIT_AGENTS_JSON` | *(built-in demo set)* | JSON array of `Agent` values. |
//! | `CONDUIT_MAX_STORED_PLANS` | `100` | Plan Store retention. |
//! | `CONDUIT_MAX_COST_ENTRIES` | `10000` | Cost Tracker ring capacity. |
//! | `CONDUIT_EXAMPLE_MAX_LEN` | `1200` | Few-shot example warn threshold. |
//! | `CONDUIT_RATE_LIMIT_MAX` | `100` | Requests per client per window. |
//! | `CONDUIT_RATE_LIMIT_WINDOW_SECS` | `60` | Rate limit window. |
//! | `OPENAI_API_KEY` / `OPENAI_BASE_URL` | *(none)* / `https://api.openai.com/v1` | Remote OpenAI-compatible provider. |
//! | `OLLAMA_BASE_URL` | `http://localhost:11434/v1` | Local OpenAI-compatible provider. |

use conduit_dispatch::AgentDispatcher;
use conduit_pricing::{CostTracker, PricingTable};
use conduit_providers::{OpenAiCompatProvider, ProviderRegistry};
use conduit_server::{AppState, ConduitServer, ConduitServerConfig};
use conduit_store::PlanStore;
use conduit_types::agent::{Agent, FewShotExample, InMemoryAgentCatalog, RoutingConfig, RoutingPolicy};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn env_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

/// Built-in demo agent catalog, used when `CONDUIT_AGENTS_JSON` is unset —
/// enough to exercise every workflow DSL feature end to end.
fn default_agents() -> Vec<Agent> {
    vec![
        Agent {
            id: "svc".into(),
            title: "Service Engineer".into(),
            guild: "engineering".into(),
            responsibilities: vec!["build and ship backend services".into(), "keep CI green".into()],
            kpis: vec!["build success rate".into(), "deploy frequency".into()],
            routing: RoutingConfig {
                local_candidates: vec!["ollama:llama3".into()],
                remote_candidates: vec!["openai:gpt-4o".into(), "openai:gpt-4o-mini".into()],
                default_model: "ollama:llama3".into(),
                temperature: 0.4,
                max_tokens: 2048,
                timeout: Duration::from_secs(30),
                policy: Some(RoutingPolicy::default()),
                system_prompt: None,
                style_guidelines: Some("Be direct. State what changed and why it matters.".into()),
                examples: vec![FewShotExample {
                    user: "build the auth service".into(),
                    assistant: "Building auth-service... compiled, unit tests green, pushed image.".into(),
                }],
            },
        },
        Agent {
            id: "websmith".into(),
            title: "Web Smith".into(),
            guild: "frontend".into(),
            responsibilities: vec!["implement UI features".into()],
            kpis: vec!["lighthouse score".into()],
            routing: RoutingConfig {
                local_candidates: vec!["ollama:llama3".into()],
                remote_candidates: vec!["openai:gpt-4o".into()],
                default_model: "ollama:llama3".into(),
                ..default_routing()
            },
        },
        Agent {
            id: "crafter".into(),
            title: "Design Crafter".into(),
            guild: "design".into(),
            responsibilities: vec!["review UX flows".into()],
            kpis: vec!["design review turnaround".into()],
            routing: default_routing(),
        },
        Agent {
            id: "huntress".into(),
            title: "Security Huntress".into(),
            guild: "security".into(),
            responsibilities: vec!["run security scans".into(), "triage vulnerabilities".into()],
            kpis: vec!["mean time to remediation".into()],
            routing: RoutingConfig {
                remote_candidates: vec!["openai:gpt-4o".into()],
                default_model: "openai:gpt-4o".into(),
                ..default_routing()
            },
        },
    ]
}

fn default_routing() -> RoutingConfig {
    RoutingConfig {
        local_candidates: vec![],
        remote_candidates: vec![],
        default_model: "ollama:llama3".into(),
        temperature: 0.7,
        max_tokens: 2048,
        timeout: Duration::from_secs(30),
        policy: None,
        system_prompt: None,
        style_guidelines: None,
        examples: vec![],
    }
}

fn load_agents() -> Vec<Agent> {
    match std::env::var("CONDUIT_AGENTS_JSON") {
        Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::error!(error = %e, "CONDUIT_AGENTS_JSON is not valid JSON; falling back to built-in agents");
            default_agents()
        }),
        Err(_) => default_agents(),
    }
}

fn build_provider_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    let ollama_base = std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| "http://localhost:11434/v1".to_string());
    registry.register(Arc::new(OpenAiCompatProvider::new("ollama", ollama_base, None)));

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        let openai_base = std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
        registry.register(Arc::new(OpenAiCompatProvider::new("openai", openai_base, Some(openai_key))));
    } else {
        tracing::warn!("OPENAI_API_KEY is not set — remote fallback candidates will fail closed");
    }

    registry
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("conduit_server=info".parse().unwrap()))
        .init();

    let port: u16 = env_var("CONDUIT_PORT", 3000);
    let max_stored_plans: usize = env_var("CONDUIT_MAX_STORED_PLANS", 100);
    let max_cost_entries: usize = env_var("CONDUIT_MAX_COST_ENTRIES", 10_000);
    let example_max_len: usize = env_var("CONDUIT_EXAMPLE_MAX_LEN", 1200);
    let rate_limit_max_requests: u64 = env_var("CONDUIT_RATE_LIMIT_MAX", 100);
    let rate_limit_window_secs: u64 = env_var("CONDUIT_RATE_LIMIT_WINDOW_SECS", 60);

    let agents = load_agents();
    tracing::info!(agent_count = agents.len(), "agent catalog materialized");
    let catalog = Arc::new(InMemoryAgentCatalog::new(agents));

    let registry = Arc::new(build_provider_registry());
    let pricing = Arc::new(PricingTable::with_defaults());
    let tracker = Arc::new(CostTracker::with_capacity(pricing, max_cost_entries));
    let dispatcher = Arc::new(
        AgentDispatcher::new(catalog.clone(), registry, tracker.clone()).with_example_max_len(example_max_len),
    );
    let plans = Arc::new(PlanStore::with_capacity(max_stored_plans));
    let rate_limiter = Arc::new(conduit_server::rate_limit::RateLimiter::new(
        rate_limit_max_requests,
        Duration::from_secs(rate_limit_window_secs),
    ));

    let state = AppState::new(catalog, dispatcher, tracker, plans, rate_limiter);
    let config = ConduitServerConfig {
        port,
        rate_limit_max_requests,
        rate_limit_window: Duration::from_secs(rate_limit_window_secs),
    };

    if let Err(e) = ConduitServer::new(config).start(state).await {
        eprintln!("conduit-server error: {e}");
        std::process::exit(1);
    }
}
