//! Shared application state injected into every handler via axum's `State`
//! extractor.

use crate::rate_limit::RateLimiter;
use conduit_dispatch::AgentDispatcher;
use conduit_pricing::CostTracker;
use conduit_store::PlanStore;
use conduit_types::agent::AgentCatalog;
use dashmap::DashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn AgentCatalog>,
    pub dispatcher: Arc<AgentDispatcher>,
    pub tracker: Arc<CostTracker>,
    pub plans: Arc<PlanStore>,
    pub rate_limiter: Arc<RateLimiter>,
    /// Cancellation tokens for plans currently executing through
    /// `executeWorkflow`, keyed by plan id, so `cancelPlan` can reach an
    /// in-flight run from a concurrent request.
    pub cancellations: Arc<DashMap<String, CancellationToken>>,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn AgentCatalog>,
        dispatcher: Arc<AgentDispatcher>,
        tracker: Arc<CostTracker>,
        plans: Arc<PlanStore>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            catalog,
            dispatcher,
            tracker,
            plans,
            rate_limiter,
            cancellations: Arc::new(DashMap::new()),
            started_at: chrono::Utc::now(),
        }
    }

    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}
