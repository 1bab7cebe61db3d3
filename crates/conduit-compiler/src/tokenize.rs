//! Phase/task splitting and validation.

use crate::error::CompileError;
use once_cell::sync::Lazy;
use regex::Regex;

static THEN_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bTHEN\b").unwrap());
static AND_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bAND\b").unwrap());

const OPERATORS: [&str; 3] = ["then", "and", "if"];

/// Validates leading/adjacent operator placement, then splits `text` into
/// ordered phases, each an ordered list of raw task tokens (conditional
/// suffix and agentId prefix not yet stripped).
pub fn split_phases(text: &str) -> Result<Vec<Vec<String>>, CompileError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CompileError::Empty);
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    let first_lower = words[0].to_lowercase();
    if OPERATORS.contains(&first_lower.as_str()) {
        return Err(CompileError::LeadingOperator(words[0].to_string()));
    }

    // Only THEN/AND may not appear back to back with nothing but whitespace
    // between them; IF always has content (a condition) following it and is
    // checked separately by the condition parser.
    for pair in words.windows(2) {
        let a = pair[0].to_lowercase();
        let b = pair[1].to_lowercase();
        if (a == "then" || a == "and") && (b == "then" || b == "and") {
            return Err(CompileError::AdjacentOperators(pair[0].to_string(), pair[1].to_string()));
        }
    }

    let phases: Vec<Vec<String>> = THEN_SPLIT
        .split(trimmed)
        .map(|phase| {
            AND_SPLIT
                .split(phase)
                .map(|task| task.trim().to_string())
                .filter(|task| !task.is_empty())
                .collect()
        })
        .collect();

    Ok(phases)
}

/// Splits a colon-prefixed agent id off the front of a task token, per the
/// 30-char / no-space heuristic: a colon within the first 30 characters
/// whose prefix contains no whitespace is treated as `agentId:`, otherwise
/// the colon is ordinary task text.
pub fn split_agent_prefix(token: &str) -> (Option<String>, String) {
    if let Some(colon_pos) = token.find(':') {
        let prefix = &token[..colon_pos];
        if colon_pos < 30 && !prefix.chars().any(char::is_whitespace) && !prefix.is_empty() {
            let rest = token[colon_pos + 1..].trim().to_string();
            return (Some(prefix.to_string()), rest);
        }
    }
    (None, token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_input() {
        assert_eq!(split_phases("   ").unwrap_err(), CompileError::Empty);
    }

    #[test]
    fn rejects_leading_operator() {
        assert!(matches!(
            split_phases("THEN build"),
            Err(CompileError::LeadingOperator(_))
        ));
    }

    #[test]
    fn rejects_adjacent_operators() {
        assert!(matches!(
            split_phases("a THEN THEN b"),
            Err(CompileError::AdjacentOperators(_, _))
        ));
    }

    #[test]
    fn splits_sequential_phases() {
        let phases = split_phases("build THEN test THEN deploy").unwrap();
        assert_eq!(phases, vec![vec!["build"], vec!["test"], vec!["deploy"]]);
    }

    #[test]
    fn splits_parallel_tasks_within_one_phase() {
        let phases = split_phases("lint AND format AND typecheck").unwrap();
        assert_eq!(phases.len(), 1);
        assert_eq!(phases[0], vec!["lint", "format", "typecheck"]);
    }

    #[test]
    fn agent_prefix_requires_no_space_and_under_30_chars() {
        let (agent, task) = split_agent_prefix("svc: build the thing");
        assert_eq!(agent.as_deref(), Some("svc"));
        assert_eq!(task, "build the thing");
    }

    #[test]
    fn colon_with_space_in_prefix_is_not_an_agent_id() {
        let (agent, task) = split_agent_prefix("check this: it has a colon");
        assert_eq!(agent, None);
        assert_eq!(task, "check this: it has a colon");
    }

    #[test]
    fn colon_past_30_chars_is_not_an_agent_id() {
        let long_prefix = "a".repeat(31);
        let token = format!("{long_prefix}:rest");
        let (agent, task) = split_agent_prefix(&token);
        assert_eq!(agent, None);
        assert_eq!(task, token);
    }
}
