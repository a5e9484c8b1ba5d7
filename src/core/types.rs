//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

/// Unique identifier for a page execution context
///
/// A context addresses one live document behind an executor endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(pub Uuid);

impl ContextId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

/// A single recognized speech utterance, the pipeline's sole input
///
/// Created once per recognition event and consumed once. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    /// Raw recognized text as delivered by the speech capture layer
    pub text: String,
    /// When the recognition event fired
    pub captured_at: SystemTime,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            captured_at: SystemTime::now(),
        }
    }
}
