//! Prompt assembly for the agent dispatcher.

use crate::types::DispatchConstraints;
use conduit_providers::{ChatMessage, ChatRequest};
use conduit_types::agent::{Agent, FewShotExample};
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_EXAMPLE_MAX_LEN: usize = 1200;

/// Synthesize the system message when the agent has no explicit override:
/// title + responsibilities + KPIs + a fixed behavior line.
fn synthesize_system_prompt(agent: &Agent) -> String {
    let mut lines = vec![format!("You are {}, a specialized task-execution agent.", agent.title)];

    if !agent.responsibilities.is_empty() {
        lines.push("Responsibilities:".to_string());
        for r in &agent.responsibilities {
            lines.push(format!("- {r}"));
        }
    }

    if !agent.kpis.is_empty() {
        lines.push("You are evaluated against these KPIs:".to_string());
        for k in &agent.kpis {
            lines.push(format!("- {k}"));
        }
    }

    lines.push(
        "Act decisively, stay within the scope of your responsibilities, and report concrete results."
            .to_string(),
    );
    lines.join("\n")
}

/// Drop empty pairs; warn (but keep) pairs whose combined length exceeds
/// `max_len`.
fn sanitize_examples(examples: &[FewShotExample], max_len: usize) -> Vec<FewShotExample> {
    examples
        .iter()
        .filter(|e| !e.user.trim().is_empty() && !e.assistant.trim().is_empty())
        .map(|e| {
            let combined_len = e.user.len() + e.assistant.len();
            if combined_len > max_len {
                warn!(
                    combined_len,
                    max_len, "few-shot example exceeds configured maxLen; including it anyway"
                );
            }
            e.clone()
        })
        .collect()
}

/// Build the full system message: synthesized or overridden identity, plus
/// an optional "Guidelines:" block.
pub fn build_system_message(agent: &Agent) -> String {
    let mut message = agent
        .routing
        .system_prompt
        .clone()
        .unwrap_or_else(|| synthesize_system_prompt(agent));

    if let Some(guidelines) = &agent.routing.style_guidelines {
        message.push_str("\n\nGuidelines:\n");
        message.push_str(guidelines);
    }

    message
}

/// Build the full ordered message list: system message, sanitized few-shot
/// turns, then the user message (task + serialized context/constraints +
/// the terminal JSON-schema instruction).
pub fn build_messages(
    agent: &Agent,
    task: &str,
    context: &Value,
    constraints: &DispatchConstraints,
    example_max_len: usize,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(build_system_message(agent))];

    for example in sanitize_examples(&agent.routing.examples, example_max_len) {
        messages.push(ChatMessage::user(example.user));
        messages.push(ChatMessage::assistant(example.assistant));
    }

    messages.push(ChatMessage::user(build_user_message(task, context, constraints)));
    messages
}

fn build_user_message(task: &str, context: &Value, constraints: &DispatchConstraints) -> String {
    let mut parts = vec![task.to_string()];

    if !context.is_null() {
        parts.push(format!("Context:\n{}", serde_json::to_string_pretty(context).unwrap_or_default()));
    }

    if constraints.routing.model.is_some() || constraints.routing.preference.is_some() {
        parts.push(format!(
            "Constraints:\n{}",
            serde_json::to_string_pretty(constraints).unwrap_or_default()
        ));
    }

    parts.push(
        "Respond with a single JSON object matching the schema \
         { \"description\": string, \"steps\": string[], \"estimatedComplexity\": \"low\"|\"medium\"|\"high\" }."
            .to_string(),
    );

    parts.join("\n\n")
}

pub fn build_request(agent: &Agent, model: String, messages: Vec<ChatMessage>) -> ChatRequest {
    ChatRequest {
        model,
        messages,
        temperature: agent.routing.temperature,
        max_tokens: agent.routing.max_tokens,
        stream: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_types::agent::RoutingConfig;
    use std::time::Duration;

    fn agent_with(examples: Vec<FewShotExample>, system_prompt: Option<String>) -> Agent {
        Agent {
            id: "svc".into(),
            title: "Service Engineer".into(),
            guild: "engineering".into(),
            responsibilities: vec!["ship reliable services".into()],
            kpis: vec!["uptime".into()],
            routing: RoutingConfig {
                local_candidates: vec![],
                remote_candidates: vec![],
                default_model: "openai:gpt-4o".into(),
                temperature: 0.5,
                max_tokens: 512,
                timeout: Duration::from_secs(30),
                policy: None,
                system_prompt,
                style_guidelines: Some("Be concise.".into()),
                examples,
            },
        }
    }

    #[test]
    fn synthesizes_system_prompt_from_title_and_responsibilities() {
        let agent = agent_with(vec![], None);
        let message = build_system_message(&agent);
        assert!(message.contains("Service Engineer"));
        assert!(message.contains("ship reliable services"));
        assert!(message.contains("uptime"));
        assert!(message.contains("Guidelines:"));
        assert!(message.contains("Be concise."));
    }

    #[test]
    fn explicit_system_prompt_overrides_synthesis() {
        let agent = agent_with(vec![], Some("Custom prompt.".into()));
        let message = build_system_message(&agent);
        assert!(message.starts_with("Custom prompt."));
        assert!(!message.contains("Service Engineer"));
    }

    #[test]
    fn empty_examples_are_dropped() {
        let examples = vec![
            FewShotExample {
                user: "".into(),
                assistant: "reply".into(),
            },
            FewShotExample {
                user: "hi".into(),
                assistant: "".into(),
            },
            FewShotExample {
                user: "real question".into(),
                assistant: "real answer".into(),
            },
        ];
        let sanitized = sanitize_examples(&examples, DEFAULT_EXAMPLE_MAX_LEN);
        assert_eq!(sanitized.len(), 1);
        assert_eq!(sanitized[0].user, "real question");
    }

    #[test]
    fn user_message_ends_with_schema_instruction() {
        let constraints = DispatchConstraints::default();
        let message = build_user_message("do the thing", &Value::Null, &constraints);
        assert!(message.ends_with("\"low\"|\"medium\"|\"high\" }."));
    }
}
