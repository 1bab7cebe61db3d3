//! Plan store: a bounded, recency-ordered in-memory catalog of plans.
//!
//! `save` overwrites in place; once the store holds more than
//! `max_stored_plans` entries, the oldest by `created_at` are dropped.
//! Reads return cloned snapshots so callers never observe a plan the
//! executor is mutating mid-update.

use conduit_types::plan::{Plan, PlanStatus};
use parking_lot::RwLock;
use std::collections::HashMap;

const DEFAULT_MAX_STORED_PLANS: usize = 100;

pub struct PlanStore {
    plans: RwLock<HashMap<String, Plan>>,
    max_stored_plans: usize,
}

impl PlanStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_STORED_PLANS)
    }

    pub fn with_capacity(max_stored_plans: usize) -> Self {
        Self {
            plans: RwLock::new(HashMap::new()),
            max_stored_plans,
        }
    }

    /// Insert or overwrite `plan`, then evict the oldest-by-`created_at`
    /// entries until the store is back within capacity.
    pub fn save(&self, plan: Plan) {
        let mut plans = self.plans.write();
        plans.insert(plan.id.clone(), plan);
        if plans.len() > self.max_stored_plans {
            let overflow = plans.len() - self.max_stored_plans;
            let mut ids_by_age: Vec<(String, chrono::DateTime<chrono::Utc>)> =
                plans.iter().map(|(id, p)| (id.clone(), p.created_at)).collect();
            ids_by_age.sort_by_key(|(_, created_at)| *created_at);
            for (id, _) in ids_by_age.into_iter().take(overflow) {
                plans.remove(&id);
            }
        }
        tracing::debug!(stored = plans.len(), "plan store updated");
    }

    pub fn get(&self, plan_id: &str) -> Option<Plan> {
        self.plans.read().get(plan_id).cloned()
    }

    pub fn remove(&self, plan_id: &str) -> Option<Plan> {
        self.plans.write().remove(plan_id)
    }

    /// All plans ordered by descending `created_at` (most recent first).
    pub fn list(&self) -> Vec<Plan> {
        let mut plans: Vec<Plan> = self.plans.read().values().cloned().collect();
        plans.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        plans
    }

    /// Plans matching `status`, ordered by descending `created_at`.
    pub fn get_by_status(&self, status: PlanStatus) -> Vec<Plan> {
        self.list().into_iter().filter(|p| p.status == status).collect()
    }

    pub fn clear(&self) {
        self.plans.write().clear();
    }

    pub fn len(&self) -> usize {
        self.plans.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PlanStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_types::plan::PlanMetadata;
    use std::thread::sleep;
    use std::time::Duration;

    fn plan(id: &str, status: PlanStatus) -> Plan {
        Plan {
            id: id.into(),
            description: "d".into(),
            created_at: chrono::Utc::now(),
            status,
            steps: vec![],
            metadata: PlanMetadata {
                total_steps: 0,
                parallel_batches: 0,
                estimated_duration_secs: 0,
                original_text: String::new(),
            },
        }
    }

    #[test]
    fn save_then_get_round_trips() {
        let store = PlanStore::new();
        store.save(plan("p1", PlanStatus::Pending));
        let fetched = store.get("p1").unwrap();
        assert_eq!(fetched.id, "p1");
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn save_overwrites_in_place() {
        let store = PlanStore::new();
        store.save(plan("p1", PlanStatus::Pending));
        store.save(plan("p1", PlanStatus::Completed));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("p1").unwrap().status, PlanStatus::Completed);
    }

    #[test]
    fn eviction_drops_oldest_by_created_at() {
        let store = PlanStore::with_capacity(2);
        for id in ["p1", "p2", "p3"] {
            store.save(plan(id, PlanStatus::Pending));
            sleep(Duration::from_millis(2));
        }
        assert_eq!(store.len(), 2);
        assert!(store.get("p1").is_none());
        assert!(store.get("p2").is_some());
        assert!(store.get("p3").is_some());
    }

    #[test]
    fn list_orders_by_descending_created_at() {
        let store = PlanStore::new();
        for id in ["p1", "p2", "p3"] {
            store.save(plan(id, PlanStatus::Pending));
            sleep(Duration::from_millis(2));
        }
        let ids: Vec<String> = store.list().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["p3", "p2", "p1"]);
    }

    #[test]
    fn get_by_status_filters() {
        let store = PlanStore::new();
        store.save(plan("p1", PlanStatus::Completed));
        store.save(plan("p2", PlanStatus::Failed));
        store.save(plan("p3", PlanStatus::Completed));
        let completed = store.get_by_status(PlanStatus::Completed);
        assert_eq!(completed.len(), 2);
    }

    #[test]
    fn clear_empties_the_store() {
        let store = PlanStore::new();
        store.save(plan("p1", PlanStatus::Pending));
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn remove_deletes_a_single_plan() {
        let store = PlanStore::new();
        store.save(plan("p1", PlanStatus::Pending));
        store.save(plan("p2", PlanStatus::Pending));
        let removed = store.remove("p1");
        assert!(removed.is_some());
        assert_eq!(store.len(), 1);
        assert!(store.get("p1").is_none());
    }
}
