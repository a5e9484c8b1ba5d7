//! Command execution against a page
//!
//! The executor is the only component that mutates the page. Each
//! command produces exactly one spoken line (confirmation or failure)
//! except stop, which only silences whatever is playing. Failures are
//! reported in the ExecutionReport rather than propagated: a command
//! that finds nothing to click is a normal outcome, not a pipeline
//! error.

pub mod resolve;

use std::time::Duration;

use crate::command::model::{Command, HistoryDirection, ScrollDirection};
use crate::core::config::config;
use crate::core::error::ExecutionError;
use crate::page::PageDom;
use crate::speech::SpeechFeedback;
use crate::summary::SummarizationService;

/// Outcome of executing a single command
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    /// Line handed to speech feedback, if any
    pub spoken: Option<String>,
    /// Failure description when the command could not do its work
    pub error: Option<String>,
}

impl ExecutionReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Executes translated commands against the page
pub struct CommandExecutor;

impl CommandExecutor {
    /// Execute one command, speaking the outcome
    pub async fn execute(
        page: &mut PageDom,
        speech: &SpeechFeedback,
        summarizer: &SummarizationService,
        command: &Command,
    ) -> ExecutionReport {
        tracing::debug!(action = command.name(), url = %page.url, "executing command");

        match command {
            Command::Scroll { direction } => Self::execute_scroll(page, speech, *direction),
            Command::Navigate { to, url } => {
                Self::execute_navigate(page, speech, *to, url.as_deref())
            }
            Command::Click {
                by_text,
                which_index,
            } => Self::execute_click(page, speech, by_text.as_deref(), *which_index).await,
            Command::Type { text, target } => {
                Self::execute_type(page, speech, text, target.as_deref())
            }
            Command::Read {
                target,
                which_index,
            } => Self::execute_read(page, speech, *target, *which_index),
            Command::Summarize {
                target,
                which_index,
            } => Self::execute_summarize(page, speech, summarizer, *target, *which_index).await,
            Command::Find { query } => Self::execute_find(page, speech, query),
            Command::Stop => {
                speech.cancel();
                ExecutionReport::default()
            }
            Command::Unknown => spoke(speech, "Sorry, I didn't understand that.".into()),
        }
    }

    fn execute_scroll(
        page: &mut PageDom,
        speech: &SpeechFeedback,
        direction: ScrollDirection,
    ) -> ExecutionReport {
        let step = page.scroll.viewport * config().scroll_fraction;
        match direction {
            ScrollDirection::Down => {
                page.scroll_by(step);
                spoke(speech, "Scrolling down.".into())
            }
            ScrollDirection::Up => {
                page.scroll_by(-step);
                spoke(speech, "Scrolling up.".into())
            }
            ScrollDirection::Top => {
                page.scroll_to_top();
                spoke(speech, "Top of page.".into())
            }
            ScrollDirection::Bottom => {
                page.scroll_to_bottom();
                spoke(speech, "Bottom of page.".into())
            }
        }
    }

    fn execute_navigate(
        page: &mut PageDom,
        speech: &SpeechFeedback,
        to: Option<HistoryDirection>,
        url: Option<&str>,
    ) -> ExecutionReport {
        match (to, url) {
            (Some(HistoryDirection::Back), _) => {
                if page.history_back() {
                    spoke(speech, "Going back.".into())
                } else {
                    // History edge is an answered question, not a failure
                    spoke(speech, "Can't go back any further.".into())
                }
            }
            (Some(HistoryDirection::Forward), _) => {
                if page.history_forward() {
                    spoke(speech, "Going forward.".into())
                } else {
                    spoke(speech, "Can't go forward any further.".into())
                }
            }
            (None, Some(url)) => {
                page.navigate(url);
                spoke(speech, format!("Opening {}.", display_url(url)))
            }
            (None, None) => failed(
                speech,
                "I'm not sure where you want to go.".into(),
                "navigate command without destination".into(),
            ),
        }
    }

    async fn execute_click(
        page: &mut PageDom,
        speech: &SpeechFeedback,
        by_text: Option<&str>,
        which_index: Option<usize>,
    ) -> ExecutionReport {
        let index = match resolve::resolve_element(page, by_text, which_index) {
            Ok(index) => index,
            Err(e) => {
                let line = match &e {
                    ExecutionError::NoMatchingElement(text) => {
                        format!("I couldn't find {}.", text)
                    }
                    _ => "There aren't that many items here.".to_string(),
                };
                return failed(speech, line, e.to_string());
            }
        };

        // Highlight first so the user can see what is about to happen,
        // then activate after a short beat.
        page.highlight(index);
        tokio::time::sleep(Duration::from_millis(config().highlight_delay_ms)).await;

        let label = page.elements[index].label.clone();
        let navigates = page.elements[index].href.is_some();
        page.activate(index);

        if navigates {
            spoke(speech, format!("Opening {}.", label))
        } else {
            spoke(speech, format!("Clicked {}.", label))
        }
    }

    fn execute_type(
        page: &mut PageDom,
        speech: &SpeechFeedback,
        text: &str,
        target: Option<&str>,
    ) -> ExecutionReport {
        match resolve::resolve_field(page, target) {
            Ok(index) => {
                page.set_field_value(index, text);
                spoke(speech, format!("Typed {}.", text))
            }
            Err(e) => failed(
                speech,
                "I couldn't find anywhere to type that.".into(),
                e.to_string(),
            ),
        }
    }

    fn execute_read(
        page: &mut PageDom,
        speech: &SpeechFeedback,
        target: crate::command::model::ReadTarget,
        which_index: Option<usize>,
    ) -> ExecutionReport {
        match resolve::resolve_read_source(page, target, which_index) {
            Ok(text) => spoke(speech, resolve::clip_for_speech(&text)),
            Err(e) => failed(speech, read_failure_line(&e), e.to_string()),
        }
    }

    async fn execute_summarize(
        page: &mut PageDom,
        speech: &SpeechFeedback,
        summarizer: &SummarizationService,
        target: crate::command::model::ReadTarget,
        which_index: Option<usize>,
    ) -> ExecutionReport {
        let source = match resolve::resolve_read_source(page, target, which_index) {
            Ok(text) => text,
            Err(e) => return failed(speech, read_failure_line(&e), e.to_string()),
        };

        match summarizer.summarize(&source).await {
            Ok(summary) => spoke(speech, summary),
            Err(e) => failed(
                speech,
                "Sorry, I couldn't summarize that right now.".into(),
                e.to_string(),
            ),
        }
    }

    fn execute_find(
        page: &mut PageDom,
        speech: &SpeechFeedback,
        query: &str,
    ) -> ExecutionReport {
        let query = query.trim();
        if query.is_empty() {
            return failed(
                speech,
                "What should I look for?".into(),
                "find command with empty query".into(),
            );
        }
        if page.find_text(query) {
            spoke(speech, format!("Found {}.", query))
        } else {
            spoke(speech, format!("I couldn't find {} on this page.", query))
        }
    }
}

fn spoke(speech: &SpeechFeedback, line: String) -> ExecutionReport {
    speech.speak(&line);
    ExecutionReport {
        spoken: Some(line),
        error: None,
    }
}

fn failed(speech: &SpeechFeedback, line: String, error: String) -> ExecutionReport {
    speech.speak(&line);
    ExecutionReport {
        spoken: Some(line),
        error: Some(error),
    }
}

fn read_failure_line(error: &ExecutionError) -> String {
    match error {
        ExecutionError::IndexOutOfRange { .. } => "I couldn't find that paragraph.".to_string(),
        _ => "There's nothing to read here.".to_string(),
    }
}

/// Trim the scheme and leading www for spoken URLs
fn display_url(url: &str) -> &str {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::model::ReadTarget;

    fn fixtures() -> (SpeechFeedback, SummarizationService) {
        (
            SpeechFeedback::new(),
            SummarizationService::scripted(Vec::<String>::new()),
        )
    }

    #[tokio::test]
    async fn test_scroll_moves_most_of_a_viewport() {
        let (speech, summarizer) = fixtures();
        let mut page = PageDom::new("https://example.com").with_viewport(1000.0, 5000.0);

        let report = CommandExecutor::execute(
            &mut page,
            &speech,
            &summarizer,
            &Command::Scroll {
                direction: ScrollDirection::Down,
            },
        )
        .await;

        assert!(report.is_ok());
        assert!((page.scroll.offset - 800.0).abs() < 0.01);
        assert_eq!(report.spoken.as_deref(), Some("Scrolling down."));
    }

    #[tokio::test]
    async fn test_click_follows_link_and_announces() {
        let (speech, summarizer) = fixtures();
        let mut page = PageDom::new("https://example.com");
        page.add_link("Contact Us", "https://example.com/contact");

        let report = CommandExecutor::execute(
            &mut page,
            &speech,
            &summarizer,
            &Command::click_text("contact"),
        )
        .await;

        assert!(report.is_ok());
        assert_eq!(page.url, "https://example.com/contact");
        assert_eq!(report.spoken.as_deref(), Some("Opening Contact Us."));
    }

    #[tokio::test]
    async fn test_click_miss_is_spoken_not_fatal() {
        let (speech, summarizer) = fixtures();
        let mut page = PageDom::new("https://example.com");
        page.add_link("Home", "/home");

        let report = CommandExecutor::execute(
            &mut page,
            &speech,
            &summarizer,
            &Command::click_text("checkout"),
        )
        .await;

        assert!(!report.is_ok());
        assert_eq!(report.spoken.as_deref(), Some("I couldn't find checkout."));
    }

    #[tokio::test]
    async fn test_type_into_named_field() {
        let (speech, summarizer) = fixtures();
        let mut page = PageDom::new("https://example.com");
        page.add_field("search");

        let report = CommandExecutor::execute(
            &mut page,
            &speech,
            &summarizer,
            &Command::Type {
                text: "rust async".into(),
                target: Some("search".into()),
            },
        )
        .await;

        assert!(report.is_ok());
        assert_eq!(page.fields[0].value, "rust async");
    }

    #[tokio::test]
    async fn test_read_selection() {
        let (speech, summarizer) = fixtures();
        let mut page = PageDom::new("https://example.com");
        page.set_selection("The selected passage.");

        let report = CommandExecutor::execute(
            &mut page,
            &speech,
            &summarizer,
            &Command::Read {
                target: ReadTarget::Selection,
                which_index: None,
            },
        )
        .await;

        assert_eq!(report.spoken.as_deref(), Some("The selected passage."));
    }

    #[tokio::test]
    async fn test_stop_is_silent_and_cancels() {
        let (speech, summarizer) = fixtures();
        let mut page = PageDom::new("https://example.com");
        speech.speak("a long article being read aloud");

        let report =
            CommandExecutor::execute(&mut page, &speech, &summarizer, &Command::Stop).await;

        assert!(report.is_ok());
        assert_eq!(report.spoken, None);
        assert!(speech.active().is_none());
        assert_eq!(speech.cancelled_count(), 1);
    }

    #[tokio::test]
    async fn test_history_edge_speaks_without_error() {
        let (speech, summarizer) = fixtures();
        let mut page = PageDom::new("https://example.com");

        let report = CommandExecutor::execute(
            &mut page,
            &speech,
            &summarizer,
            &Command::navigate_history(HistoryDirection::Back),
        )
        .await;

        assert!(report.is_ok());
        assert_eq!(
            report.spoken.as_deref(),
            Some("Can't go back any further.")
        );
    }

    #[tokio::test]
    async fn test_summarize_uses_service() {
        let (speech, _) = fixtures();
        let summarizer = SummarizationService::scripted(["A short summary."]);
        let mut page = PageDom::new("https://example.com");
        page.article_text = Some(
            "A long article body that easily clears the minimum page text length \
             threshold used by the resolution step, repeated once more to be safe."
                .repeat(2),
        );

        let report = CommandExecutor::execute(
            &mut page,
            &speech,
            &summarizer,
            &Command::Summarize {
                target: ReadTarget::Page,
                which_index: None,
            },
        )
        .await;

        assert!(report.is_ok());
        assert_eq!(report.spoken.as_deref(), Some("A short summary."));
    }
}
