//! Stream event tagged union for the duplex streaming surface.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    Start {
        agent_id: String,
        task: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    Chunk {
        agent_id: String,
        content: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    Complete {
        agent_id: String,
        response: String,
        kpis: Vec<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
    Error {
        agent_id: String,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl StreamEvent {
    pub fn agent_id(&self) -> &str {
        match self {
            StreamEvent::Start { agent_id, .. }
            | StreamEvent::Chunk { agent_id, .. }
            | StreamEvent::Complete { agent_id, .. }
            | StreamEvent::Error { agent_id, .. } => agent_id,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete { .. } | StreamEvent::Error { .. })
    }
}

/// Progress snapshot emitted by the plan executor after every state
/// transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanProgress {
    pub plan_id: String,
    /// 1-based index of the first running step, or 0 if none is running.
    pub current_step: usize,
    pub total_steps: usize,
    pub completed_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    pub status: crate::plan::PlanStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_classification() {
        let now = chrono::Utc::now();
        let start = StreamEvent::Start {
            agent_id: "a".into(),
            task: "t".into(),
            timestamp: now,
        };
        let complete = StreamEvent::Complete {
            agent_id: "a".into(),
            response: "r".into(),
            kpis: vec![],
            timestamp: now,
        };
        assert!(!start.is_terminal());
        assert!(complete.is_terminal());
        assert_eq!(start.agent_id(), "a");
    }
}
