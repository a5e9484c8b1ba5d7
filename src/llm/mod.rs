//! AI translation of transcripts into commands
//!
//! The translator parses SPEECH only - it never decides what happens on
//! the page. A translator failure is routine, not exceptional: the
//! deterministic fallback interpreter substitutes transparently.

pub mod client;
pub mod translator;

pub use client::LlmClient;
pub use translator::IntentTranslator;
