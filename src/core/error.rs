use thiserror::Error;

use crate::core::types::ContextId;

/// Errors from the AI translation step.
///
/// These are always recovered locally by falling back to the deterministic
/// interpreter - they never surface to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslationError {
    #[error("translation service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("malformed translator output: {0}")]
    MalformedOutput(String),
}

/// Errors from command delivery across the execution boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("no executor reachable in context {0:?}")]
    TargetUnreachable(ContextId),

    #[error("delivery retry exhausted for context {0:?}")]
    RetryExhausted(ContextId),
}

/// Errors from command execution against the page.
///
/// Terminal for the current command only: the executor speaks a failure
/// line and the pipeline moves on to the next transcript.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("no element matching '{0}'")]
    NoMatchingElement(String),

    #[error("index {index} out of range ({available} available)")]
    IndexOutOfRange { index: usize, available: usize },

    #[error("nothing to read: {0}")]
    EmptySource(String),
}

/// Errors from the summarization round trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizationError {
    #[error("summarization service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("not enough text to summarize")]
    EmptyInput,
}

/// Top-level error for binary and setup paths.
#[derive(Error, Debug)]
pub enum PilotError {
    #[error("translation error: {0}")]
    Translation(#[from] TranslationError),

    #[error("delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("summarization error: {0}")]
    Summarization(#[from] SummarizationError),

    #[error("service error: {0}")]
    Service(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PilotError>;
