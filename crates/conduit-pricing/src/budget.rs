//! Optional, advisory per-agent budget ceilings.
//!
//! This is additive: nothing in the dispatcher's call contract fails
//! because of a budget, so callers that never touch this module see no
//! behavioral change. It exists so a caller *can* check "are we near the
//! ceiling" before issuing a dispatch.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub max_cost_per_session: Option<f64>,
    pub max_cost_per_day: Option<f64>,
}

impl BudgetConfig {
    pub fn unlimited() -> Self {
        Self::default()
    }

    pub fn with_max_cost_per_session(mut self, usd: f64) -> Self {
        self.max_cost_per_session = Some(usd);
        self
    }

    pub fn with_max_cost_per_day(mut self, usd: f64) -> Self {
        self.max_cost_per_day = Some(usd);
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BudgetStatus {
    pub session_cost: f64,
    pub daily_cost: f64,
    pub config: BudgetConfig,
}

impl BudgetStatus {
    pub fn is_near_limit(&self, threshold: f64) -> bool {
        let session_hit = self
            .config
            .max_cost_per_session
            .map(|max| max > 0.0 && self.session_cost / max >= threshold)
            .unwrap_or(false);
        let daily_hit = self
            .config
            .max_cost_per_day
            .map(|max| max > 0.0 && self.daily_cost / max >= threshold)
            .unwrap_or(false);
        session_hit || daily_hit
    }

    pub fn is_exceeded(&self) -> bool {
        self.config
            .max_cost_per_session
            .is_some_and(|max| self.session_cost >= max)
            || self
                .config
                .max_cost_per_day
                .is_some_and(|max| self.daily_cost >= max)
    }
}

/// Advisory budget tracker keyed by agent id. Callers feed it costs as they
/// are recorded (typically alongside a `CostTracker::record` call) and may
/// consult `status` before the next dispatch.
#[derive(Debug, Clone, Default)]
pub struct BudgetLedger {
    inner: Arc<RwLock<HashMap<String, (BudgetConfig, f64, f64)>>>,
}

impl BudgetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_config(&self, agent_id: impl Into<String>, config: BudgetConfig) {
        let mut guard = self.inner.write().await;
        let entry = guard.entry(agent_id.into()).or_insert((config, 0.0, 0.0));
        entry.0 = config;
    }

    pub async fn record_spend(&self, agent_id: &str, cost_usd: f64) {
        let mut guard = self.inner.write().await;
        if let Some(entry) = guard.get_mut(agent_id) {
            entry.1 += cost_usd;
            entry.2 += cost_usd;
        }
    }

    pub async fn status(&self, agent_id: &str) -> BudgetStatus {
        let guard = self.inner.read().await;
        match guard.get(agent_id) {
            Some((config, session, daily)) => BudgetStatus {
                session_cost: *session,
                daily_cost: *daily,
                config: *config,
            },
            None => BudgetStatus::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn advisory_ledger_tracks_spend_without_blocking() {
        let ledger = BudgetLedger::new();
        ledger
            .set_config("svc", BudgetConfig::unlimited().with_max_cost_per_session(1.0))
            .await;
        ledger.record_spend("svc", 0.9).await;
        let status = ledger.status("svc").await;
        assert!(status.is_near_limit(0.8));
        assert!(!status.is_exceeded());
        ledger.record_spend("svc", 0.2).await;
        assert!(ledger.status("svc").await.is_exceeded());
    }

    #[tokio::test]
    async fn unconfigured_agent_never_reports_exceeded() {
        let ledger = BudgetLedger::new();
        let status = ledger.status("unknown").await;
        assert!(!status.is_exceeded());
    }
}
