//! Canonical command model and deterministic parsing
//!
//! Transcript -> FallbackInterpreter -> Command, or
//! Transcript -> IntentTranslator -> Command (AI path, same target type).

pub mod fallback;
pub mod model;
pub mod ordinal;

pub use fallback::FallbackInterpreter;
pub use model::{Command, HistoryDirection, ReadTarget, ScrollDirection};
pub use ordinal::{find_ordinal, ordinal_to_index};
