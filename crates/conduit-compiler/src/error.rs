use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("workflow text is empty or whitespace-only")]
    Empty,

    #[error("workflow text may not begin with the operator '{0}'")]
    LeadingOperator(String),

    #[error("workflow text contains two consecutive operators: '{0}' followed by '{1}'")]
    AdjacentOperators(String, String),
}
