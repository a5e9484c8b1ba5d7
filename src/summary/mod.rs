//! Text summarization round trip
//!
//! Invoked for `summarize` commands after the executor has resolved the
//! source text. Failures never fault the pipeline - the executor speaks a
//! fixed apology and moves on.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::core::config::config;
use crate::core::error::SummarizationError;
use crate::llm::client::LlmClient;

/// Where summaries come from
pub enum SummaryBackend {
    Remote(LlmClient),
    Scripted(Mutex<VecDeque<String>>),
}

/// External text-summarization capability
pub struct SummarizationService {
    backend: SummaryBackend,
}

impl SummarizationService {
    pub fn remote(client: LlmClient) -> Self {
        Self {
            backend: SummaryBackend::Remote(client),
        }
    }

    /// Replay canned summaries in order
    pub fn scripted<I>(summaries: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let queue = summaries.into_iter().map(Into::into).collect();
        Self {
            backend: SummaryBackend::Scripted(Mutex::new(queue)),
        }
    }

    /// Summarize source text into a short spoken-style summary
    ///
    /// Input below the configured minimum is rejected as EmptyInput;
    /// input above the configured cap is truncated before the request.
    pub async fn summarize(&self, text: &str) -> Result<String, SummarizationError> {
        let text = text.trim();
        if text.chars().count() < config().summary_min_chars {
            return Err(SummarizationError::EmptyInput);
        }

        let bounded = truncate_chars(text, config().summary_input_cap);

        let summary = match &self.backend {
            SummaryBackend::Remote(client) => client
                .complete(SUMMARIZE_SYSTEM_PROMPT, &bounded)
                .await
                .map_err(|e| SummarizationError::ServiceUnavailable(e.to_string()))?,
            SummaryBackend::Scripted(queue) => {
                let mut queue = queue.lock().unwrap_or_else(|e| e.into_inner());
                queue.pop_front().ok_or_else(|| {
                    SummarizationError::ServiceUnavailable("scripted summary queue empty".into())
                })?
            }
        };

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(SummarizationError::ServiceUnavailable(
                "empty summary".into(),
            ));
        }
        Ok(summary.to_string())
    }
}

/// Truncate to a character count without splitting a code point
fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// System prompt for summarization
const SUMMARIZE_SYSTEM_PROMPT: &str = r#"Summarize the text you receive for someone listening by ear.
Two or three plain sentences, most important point first.
No preamble, no markdown, no bullet lists - just the sentences."#;

#[cfg(test)]
mod tests {
    use super::*;

    fn long_text() -> String {
        "The committee voted on Thursday to approve the new transit plan, \
         which adds two light rail lines and restructures the bus network \
         around them over the next decade."
            .to_string()
    }

    #[tokio::test]
    async fn test_scripted_round_trip() {
        let service = SummarizationService::scripted(["A transit plan was approved."]);
        let summary = service.summarize(&long_text()).await.unwrap();
        assert_eq!(summary, "A transit plan was approved.");
    }

    #[tokio::test]
    async fn test_short_input_is_rejected() {
        let service = SummarizationService::scripted(["unused"]);
        let result = service.summarize("too short").await;
        assert_eq!(result, Err(SummarizationError::EmptyInput));
    }

    #[tokio::test]
    async fn test_exhausted_queue_is_unavailable() {
        let service = SummarizationService::scripted(Vec::<String>::new());
        let result = service.summarize(&long_text()).await;
        assert!(matches!(
            result,
            Err(SummarizationError::ServiceUnavailable(_))
        ));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "héllo wörld";
        let truncated = truncate_chars(text, 4);
        assert_eq!(truncated, "héll");
    }
}
