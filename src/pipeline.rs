//! The command pipeline, from captured transcript to spoken outcome
//!
//! Order of interpretation is fixed: site strategies first, then the
//! translator, then the fallback rules. Every transcript produces a
//! report; interpretation and delivery failures degrade into spoken
//! lines instead of propagating, so one bad command never wedges the
//! pipeline for the next one.

use std::sync::Arc;

use crate::command::fallback::FallbackInterpreter;
use crate::command::model::Command;
use crate::core::error::DeliveryError;
use crate::core::types::{ContextId, Transcript};
use crate::delivery::{CommandRouter, DeliveryRegistry, Envelope, EnvelopeReply};
use crate::llm::IntentTranslator;
use crate::page::PageDom;
use crate::site::StrategyRegistry;
use crate::speech::SpeechFeedback;
use crate::summary::SummarizationService;

/// Lifecycle checkpoints one command passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Captured,
    /// A site strategy consumed the transcript, skipping translation
    Intercepted,
    Translating,
    Translated,
    TranslationFailed,
    FallbackParsing,
    Routing,
    Delivered,
    Executed,
    Spoken,
    DeliveryFailed,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Captured => "captured",
            Stage::Intercepted => "intercepted",
            Stage::Translating => "translating",
            Stage::Translated => "translated",
            Stage::TranslationFailed => "translation-failed",
            Stage::FallbackParsing => "fallback-parsing",
            Stage::Routing => "routing",
            Stage::Delivered => "delivered",
            Stage::Executed => "executed",
            Stage::Spoken => "spoken",
            Stage::DeliveryFailed => "delivery-failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happened to one transcript, end to end
#[derive(Debug, Clone)]
pub struct CommandReport {
    pub stages: Vec<Stage>,
    pub command: Command,
    /// Name of the site strategy that intercepted, if one did
    pub strategy: Option<&'static str>,
    /// The utterance playing once the command settled
    pub spoken: Option<String>,
    pub error: Option<String>,
}

impl CommandReport {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }

    pub fn passed_through(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    /// The trace as a printable arrow chain
    pub fn trace(&self) -> String {
        self.stages
            .iter()
            .map(Stage::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

/// Coordinates interpretation, delivery, and spoken feedback
pub struct Pipeline {
    translator: Option<IntentTranslator>,
    strategies: StrategyRegistry,
    registry: DeliveryRegistry,
    speech: Arc<SpeechFeedback>,
}

impl Pipeline {
    pub fn new(
        translator: Option<IntentTranslator>,
        speech: Arc<SpeechFeedback>,
        summarizer: Arc<SummarizationService>,
    ) -> Self {
        let registry = DeliveryRegistry::new(Arc::clone(&speech), summarizer);
        Self {
            translator,
            strategies: StrategyRegistry::standard(),
            registry,
            speech,
        }
    }

    /// A pipeline with no translator: fallback rules only
    pub fn offline() -> Self {
        Self::new(
            None,
            Arc::new(SpeechFeedback::new()),
            Arc::new(SummarizationService::scripted(Vec::<String>::new())),
        )
    }

    pub fn open_context(&mut self, page: PageDom) -> ContextId {
        self.registry.open_context(page)
    }

    pub fn registry(&self) -> &DeliveryRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut DeliveryRegistry {
        &mut self.registry
    }

    pub fn speech(&self) -> &SpeechFeedback {
        &self.speech
    }

    /// Run one captured transcript through the whole pipeline
    ///
    /// Never returns an error: interpretation failures fall back to
    /// the rule engine and delivery failures end as a spoken apology,
    /// both recorded in the report.
    pub async fn handle_transcript(
        &mut self,
        transcript: &Transcript,
        ctx: ContextId,
    ) -> CommandReport {
        let mut stages = vec![Stage::Captured];
        let mut strategy = None;
        tracing::info!(text = %transcript.text, "transcript captured");

        let url = match self.registry.page(ctx) {
            Some(page) => page.lock().await.url.clone(),
            None => String::new(),
        };

        let command = if let Some((command, name)) =
            self.strategies.intercept(&url, &transcript.text)
        {
            stages.push(Stage::Intercepted);
            strategy = Some(name);
            command
        } else {
            self.interpret(&transcript.text, &mut stages).await
        };

        stages.push(Stage::Routing);
        match CommandRouter::route(&mut self.registry, ctx, command.clone()).await {
            Ok(reply) => {
                stages.push(Stage::Delivered);
                stages.push(Stage::Executed);
                stages.push(Stage::Spoken);
                let error = match reply.status {
                    crate::delivery::ReplyStatus::Success => None,
                    crate::delivery::ReplyStatus::Error => reply.message,
                };
                CommandReport {
                    stages,
                    command,
                    strategy,
                    spoken: self.speech.active().map(|u| u.text),
                    error,
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "delivery failed");
                let line = match e {
                    DeliveryError::TargetUnreachable(_) => "I can't reach this page.",
                    DeliveryError::RetryExhausted(_) => {
                        "I can't control this page right now."
                    }
                };
                self.speech.speak(line);
                stages.push(Stage::DeliveryFailed);
                CommandReport {
                    stages,
                    command,
                    strategy,
                    spoken: Some(line.to_string()),
                    error: Some(e.to_string()),
                }
            }
        }
    }

    /// The front door for already-enveloped requests
    pub async fn handle_envelope(&mut self, ctx: ContextId, envelope: Envelope) -> EnvelopeReply {
        match envelope {
            Envelope::ProcessText { text } => {
                let report = self.handle_transcript(&Transcript::new(text), ctx).await;
                match report.error {
                    None => EnvelopeReply::success(report.spoken),
                    Some(e) => EnvelopeReply::error(e),
                }
            }
            other => self
                .registry
                .send(ctx, other)
                .await
                .unwrap_or_else(|e| EnvelopeReply::error(e.to_string())),
        }
    }

    /// Transcript to Command via translator, falling back to rules
    async fn interpret(&self, text: &str, stages: &mut Vec<Stage>) -> Command {
        let Some(translator) = &self.translator else {
            stages.push(Stage::FallbackParsing);
            return FallbackInterpreter::interpret(text);
        };

        stages.push(Stage::Translating);
        match translator.translate(text).await {
            Ok(command) => {
                stages.push(Stage::Translated);
                command
            }
            Err(e) => {
                tracing::warn!(error = %e, "translation failed, using fallback rules");
                stages.push(Stage::TranslationFailed);
                stages.push(Stage::FallbackParsing);
                FallbackInterpreter::interpret(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_transcript_takes_fallback_path() {
        let mut pipeline = Pipeline::offline();
        let ctx = pipeline.open_context(PageDom::new("https://example.com"));

        let report = pipeline
            .handle_transcript(&Transcript::new("scroll down"), ctx)
            .await;

        assert!(report.succeeded());
        assert!(report.passed_through(Stage::FallbackParsing));
        assert!(!report.passed_through(Stage::Translating));
        assert_eq!(report.spoken.as_deref(), Some("Scrolling down."));

        let page = pipeline.registry().page(ctx).unwrap();
        assert!(page.lock().await.scroll.offset > 0.0);
    }

    #[tokio::test]
    async fn test_translator_success_skips_fallback() {
        let translator = IntentTranslator::scripted([r#"{"action":"stop"}"#]);
        let mut pipeline = Pipeline::new(
            Some(translator),
            Arc::new(SpeechFeedback::new()),
            Arc::new(SummarizationService::scripted(Vec::<String>::new())),
        );
        let ctx = pipeline.open_context(PageDom::new("https://example.com"));

        let report = pipeline
            .handle_transcript(&Transcript::new("please stop talking"), ctx)
            .await;

        assert_eq!(report.command, Command::Stop);
        assert!(report.passed_through(Stage::Translated));
        assert!(!report.passed_through(Stage::FallbackParsing));
    }

    #[tokio::test]
    async fn test_garbled_translation_falls_back() {
        let translator = IntentTranslator::scripted(["I am not JSON at all"]);
        let mut pipeline = Pipeline::new(
            Some(translator),
            Arc::new(SpeechFeedback::new()),
            Arc::new(SummarizationService::scripted(Vec::<String>::new())),
        );
        let ctx = pipeline.open_context(PageDom::new("https://example.com"));

        let report = pipeline
            .handle_transcript(&Transcript::new("scroll down"), ctx)
            .await;

        assert!(report.passed_through(Stage::TranslationFailed));
        assert!(report.passed_through(Stage::FallbackParsing));
        assert_eq!(
            report.command,
            Command::Scroll {
                direction: crate::command::model::ScrollDirection::Down
            }
        );
    }

    #[tokio::test]
    async fn test_site_strategy_intercepts_before_translator() {
        // Translator queue is empty: consulting it would surface as a
        // translation failure in the trace
        let translator = IntentTranslator::scripted(Vec::<String>::new());
        let mut pipeline = Pipeline::new(
            Some(translator),
            Arc::new(SpeechFeedback::new()),
            Arc::new(SummarizationService::scripted(Vec::<String>::new())),
        );
        let ctx = pipeline.open_context(PageDom::new("https://www.youtube.com/watch?v=x"));

        let report = pipeline
            .handle_transcript(&Transcript::new("open shorts"), ctx)
            .await;

        assert!(report.passed_through(Stage::Intercepted));
        assert!(!report.passed_through(Stage::Translating));
        assert_eq!(report.strategy, Some("youtube"));
    }

    #[tokio::test]
    async fn test_unknown_context_ends_in_delivery_failure() {
        let mut pipeline = Pipeline::offline();
        let ctx = ContextId::new();

        let report = pipeline
            .handle_transcript(&Transcript::new("scroll down"), ctx)
            .await;

        assert!(!report.succeeded());
        assert_eq!(report.stages.last(), Some(&Stage::DeliveryFailed));
        assert_eq!(
            report.spoken.as_deref(),
            Some("I can't control this page right now.")
        );
    }

    #[tokio::test]
    async fn test_stop_settles_with_nothing_playing() {
        let mut pipeline = Pipeline::offline();
        let ctx = pipeline.open_context(PageDom::new("https://example.com"));

        pipeline
            .handle_transcript(&Transcript::new("read the page"), ctx)
            .await;
        let report = pipeline
            .handle_transcript(&Transcript::new("stop"), ctx)
            .await;

        assert!(report.succeeded());
        assert_eq!(report.spoken, None);
        assert!(pipeline.speech().active().is_none());
    }
}
