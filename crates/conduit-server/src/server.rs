//! Axum-based HTTP/WebSocket server wiring the runtime's handlers into one
//! router.

use crate::handlers;
use crate::state::AppState;
use axum::Router;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Runtime configuration, read from environment variables at startup.
pub struct ConduitServerConfig {
    /// TCP port to listen on (default: 3000).
    pub port: u16,
    /// Sustained requests allowed per client per window.
    pub rate_limit_max_requests: u64,
    /// Rate limit window.
    pub rate_limit_window: Duration,
}

impl Default for ConduitServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            rate_limit_max_requests: 100,
            rate_limit_window: Duration::from_secs(60),
        }
    }
}

/// High-level server encapsulating configuration and router assembly.
pub struct ConduitServer {
    config: ConduitServerConfig,
}

impl ConduitServer {
    pub fn new(config: ConduitServerConfig) -> Self {
        Self { config }
    }

    /// Build the axum [`Router`] from already-constructed shared state.
    pub fn build_app(&self, state: AppState) -> Router {
        Router::new()
            .merge(handlers::health_router())
            .merge(handlers::agents_router())
            .merge(handlers::tasks_router())
            .merge(handlers::workflows_router())
            .merge(handlers::costs_router())
            .merge(handlers::stream_router())
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Bind to `0.0.0.0:{port}` and serve until the process exits.
    pub async fn start(self, state: AppState) -> std::io::Result<()> {
        let app = self.build_app(state);
        let addr = format!("0.0.0.0:{}", self.config.port);
        info!(addr = %addr, "conduit orchestration runtime starting");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await
    }
}
