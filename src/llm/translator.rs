//! Translate transcripts into structured commands
//!
//! The translator sends one request per transcript - no retries at this
//! layer. Any failure (transport, timeout, garbage output) is reported as
//! a TranslationError and the caller falls through to the deterministic
//! interpreter. The response contract: one JSON object matching the
//! Command schema, optionally wrapped in a markdown code fence.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use crate::command::model::Command;
use crate::core::config::config;
use crate::core::error::TranslationError;
use crate::llm::client::LlmClient;

/// Where translations come from
///
/// `Scripted` replays canned responses through the exact same fence
/// stripping and schema validation as the live path, so offline runs and
/// tests exercise real response processing.
pub enum TranslatorBackend {
    Remote(LlmClient),
    Scripted(Mutex<VecDeque<String>>),
}

/// AI-assisted transcript -> Command translator
pub struct IntentTranslator {
    backend: TranslatorBackend,
    timeout: Duration,
}

impl IntentTranslator {
    /// Wrap a live client, bounding each call by the configured timeout
    pub fn remote(client: LlmClient) -> Self {
        Self {
            backend: TranslatorBackend::Remote(client),
            timeout: Duration::from_secs(config().translation_timeout_secs),
        }
    }

    /// Replay canned raw responses in order
    pub fn scripted<I>(responses: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let queue = responses.into_iter().map(Into::into).collect();
        Self {
            backend: TranslatorBackend::Scripted(Mutex::new(queue)),
            timeout: Duration::from_secs(config().translation_timeout_secs),
        }
    }

    /// Translate one transcript into a Command
    ///
    /// Exactly one service attempt. A hung service is cut off by the
    /// timeout and reported as ServiceUnavailable rather than blocking
    /// the pipeline.
    pub async fn translate(&self, transcript: &str) -> Result<Command, TranslationError> {
        let raw = match &self.backend {
            TranslatorBackend::Remote(client) => {
                let call = client.complete(TRANSLATE_SYSTEM_PROMPT, transcript);
                match tokio::time::timeout(self.timeout, call).await {
                    Ok(Ok(text)) => text,
                    Ok(Err(e)) => {
                        return Err(TranslationError::ServiceUnavailable(e.to_string()));
                    }
                    Err(_) => {
                        return Err(TranslationError::ServiceUnavailable(format!(
                            "no response within {}s",
                            self.timeout.as_secs()
                        )));
                    }
                }
            }
            TranslatorBackend::Scripted(queue) => {
                let mut queue = queue.lock().unwrap_or_else(|e| e.into_inner());
                match queue.pop_front() {
                    Some(text) => text,
                    None => {
                        return Err(TranslationError::ServiceUnavailable(
                            "scripted response queue empty".into(),
                        ));
                    }
                }
            }
        };

        parse_response(&raw)
    }
}

/// Validate a raw service response against the Command schema
pub fn parse_response(raw: &str) -> Result<Command, TranslationError> {
    let unfenced = strip_fences(raw);
    let json_str = extract_json(&unfenced)?;

    serde_json::from_str(json_str).map_err(|e| {
        TranslationError::MalformedOutput(format!("{} - response: {}", e, raw.trim()))
    })
}

/// Remove markdown code-fence wrapping, if any
fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "")
}

/// Extract the JSON object from a response (handles surrounding text)
fn extract_json(response: &str) -> Result<&str, TranslationError> {
    let start = response
        .find('{')
        .ok_or_else(|| TranslationError::MalformedOutput("no JSON object in response".into()))?;
    let end = response
        .rfind('}')
        .ok_or_else(|| TranslationError::MalformedOutput("no closing brace in response".into()))?;
    if end < start {
        return Err(TranslationError::MalformedOutput(
            "braces out of order in response".into(),
        ));
    }
    Ok(&response[start..=end])
}

/// System prompt for transcript translation
const TRANSLATE_SYSTEM_PROMPT: &str = r#"You convert spoken page-control requests into structured JSON commands.
The text you receive is a raw speech transcript. Reply with exactly one JSON object and nothing else.

COMMAND SCHEMA (one object, "action" selects the shape):
{ "action": "scroll", "direction": "up" | "down" | "top" | "bottom" }
{ "action": "navigate", "to": "back" | "forward" }
{ "action": "navigate", "url": "https://..." }
{ "action": "click", "byText": "visible label text" }
{ "action": "click", "whichIndex": 0 }
{ "action": "type", "text": "what to type", "target": "field hint or omit" }
{ "action": "read", "target": "selection" | "paragraph" | "page", "whichIndex": 0 }
{ "action": "summarize", "target": "selection" | "paragraph" | "page", "whichIndex": 0 }
{ "action": "find", "query": "text to locate" }
{ "action": "stop" }
{ "action": "unknown" }

RULES:
- whichIndex is zero-based; spoken ordinals are one-based ("third" -> 2).
- Include only the fields the action uses.
- Use "unknown" when the request is not a page action.

Examples:
"scroll down a bit" -> {"action": "scroll", "direction": "down"}
"go back" -> {"action": "navigate", "to": "back"}
"open the contact link" -> {"action": "click", "byText": "contact"}
"click the third link" -> {"action": "click", "whichIndex": 2}
"type hello there in the search box" -> {"action": "type", "text": "hello there", "target": "search"}
"read the second paragraph" -> {"action": "read", "target": "paragraph", "whichIndex": 1}
"what does this page say" -> {"action": "summarize", "target": "page"}
"where does it mention pricing" -> {"action": "find", "query": "pricing"}
"that's enough" -> {"action": "stop"}
"what's the weather like" -> {"action": "unknown"}
"#;
