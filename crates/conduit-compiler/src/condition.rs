//! Conditional-suffix parsing.

use conduit_types::plan::{Condition, ConditionOperator};
use once_cell::sync::Lazy;
use regex::Regex;

static IF_SUCCESS_EXPLICIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+IF_SUCCESS\s*$").unwrap());
static IF_FAILURE_EXPLICIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+IF_FAILURE\s*$").unwrap());
static IF_CONTAINS_EXPLICIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\s+IF_CONTAINS\(\s*"([^"]*)"\s*\)\s*$"#).unwrap());
static IF_SUCCESS_NATURAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+IF\s+(?:success|passing)\s*$").unwrap());
static IF_FAILURE_NATURAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+IF\s+(?:failure|failing)\s*$").unwrap());

/// Strips a trailing conditional suffix from `token`, returning the
/// remaining text and the parsed `Condition` (always bound to `"previous"`
/// at compile time; resolved to a concrete step id at execution). Precedence:
/// explicit `IF_SUCCESS` / `IF_FAILURE` / `IF_CONTAINS("value")` before the
/// natural-language forms.
pub fn strip_condition(token: &str) -> (String, Option<Condition>) {
    if let Some(m) = IF_CONTAINS_EXPLICIT.find(token) {
        let caps = IF_CONTAINS_EXPLICIT.captures(token).expect("find implies captures");
        let value = caps.get(1).map(|m| m.as_str().to_string());
        let remainder = token[..m.start()].to_string();
        return (
            remainder,
            Some(Condition {
                target: Condition::PREVIOUS.to_string(),
                operator: ConditionOperator::IfContains,
                value,
                previous_step: None,
            }),
        );
    }

    if let Some(m) = IF_SUCCESS_EXPLICIT.find(token) {
        return (
            token[..m.start()].to_string(),
            Some(Condition {
                target: Condition::PREVIOUS.to_string(),
                operator: ConditionOperator::IfSuccess,
                value: None,
                previous_step: None,
            }),
        );
    }

    if let Some(m) = IF_FAILURE_EXPLICIT.find(token) {
        return (
            token[..m.start()].to_string(),
            Some(Condition {
                target: Condition::PREVIOUS.to_string(),
                operator: ConditionOperator::IfFailure,
                value: None,
                previous_step: None,
            }),
        );
    }

    if let Some(m) = IF_SUCCESS_NATURAL.find(token) {
        return (
            token[..m.start()].to_string(),
            Some(Condition {
                target: Condition::PREVIOUS.to_string(),
                operator: ConditionOperator::IfSuccess,
                value: None,
                previous_step: None,
            }),
        );
    }

    if let Some(m) = IF_FAILURE_NATURAL.find(token) {
        return (
            token[..m.start()].to_string(),
            Some(Condition {
                target: Condition::PREVIOUS.to_string(),
                operator: ConditionOperator::IfFailure,
                value: None,
                previous_step: None,
            }),
        );
    }

    (token.to_string(), None)
}
