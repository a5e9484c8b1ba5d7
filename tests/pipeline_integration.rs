//! Integration tests for the full command pipeline
//!
//! These tests drive transcripts end to end over the in-memory page:
//! - Interpretation (site strategy -> translator -> fallback rules)
//! - Delivery to the per-context executor endpoint
//! - Execution effects on the page model
//! - Spoken feedback for both outcomes and failures
//!
//! The translator and summarizer run on scripted backends, so every
//! network-shaped interaction is deterministic.

use std::sync::Arc;

use voicepilot::command::model::{Command, ReadTarget, ScrollDirection};
use voicepilot::core::types::{ContextId, Transcript};
use voicepilot::delivery::Envelope;
use voicepilot::llm::IntentTranslator;
use voicepilot::page::PageDom;
use voicepilot::pipeline::{CommandReport, Pipeline, Stage};
use voicepilot::speech::SpeechFeedback;
use voicepilot::summary::SummarizationService;

// ============================================================================
// Fixtures
// ============================================================================

/// An article page with three links (second is "Contact Us"), two
/// editable fields, and five qualifying paragraphs
fn article_page() -> PageDom {
    let mut page = PageDom::new("https://example.com/articles/rust-in-production")
        .with_title("Rust in Production")
        .with_viewport(900.0, 5400.0);

    page.add_link("Home", "https://example.com/");
    page.add_link("Contact Us", "https://example.com/contact");
    page.add_link("About", "https://example.com/about");
    page.add_field("search");
    page.add_field("email address");

    for i in 1..=5 {
        page.add_paragraph(format!(
            "Paragraph number {} of the article, long enough to qualify as \
             readable body text.",
            i
        ));
    }
    let article: Vec<String> = page.paragraphs.iter().map(|p| p.text.clone()).collect();
    page.article_text = Some(article.join("\n\n"));
    page
}

fn offline_pipeline() -> (Pipeline, ContextId) {
    let mut pipeline = Pipeline::offline();
    let ctx = pipeline.open_context(article_page());
    (pipeline, ctx)
}

fn scripted_pipeline<I>(responses: I) -> (Pipeline, ContextId)
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    let mut pipeline = Pipeline::new(
        Some(IntentTranslator::scripted(responses)),
        Arc::new(SpeechFeedback::new()),
        Arc::new(SummarizationService::scripted(Vec::<String>::new())),
    );
    let ctx = pipeline.open_context(article_page());
    (pipeline, ctx)
}

async fn say(pipeline: &mut Pipeline, ctx: ContextId, text: &str) -> CommandReport {
    pipeline.handle_transcript(&Transcript::new(text), ctx).await
}

// ============================================================================
// Fallback-Path Scenarios
// ============================================================================

/// Integration test: scroll command moves most of a viewport
///
/// 1. Open a page with a 900px viewport
/// 2. Say "scroll down"
/// 3. Verify the offset grew by 80% of the viewport height
/// 4. Verify the spoken confirmation
#[tokio::test]
async fn test_scroll_down_moves_eighty_percent_of_viewport() {
    let (mut pipeline, ctx) = offline_pipeline();

    let report = say(&mut pipeline, ctx, "scroll down").await;

    assert!(report.succeeded());
    assert_eq!(
        report.command,
        Command::Scroll {
            direction: ScrollDirection::Down
        }
    );
    assert_eq!(report.spoken.as_deref(), Some("Scrolling down."));

    let page = pipeline.registry().page(ctx).unwrap();
    let offset = page.lock().await.scroll.offset;
    assert!((offset - 720.0).abs() < 0.01, "offset was {}", offset);
}

/// Integration test: label matching picks the right link
///
/// 1. Page has three links; the second is labeled "Contact Us"
/// 2. Say "open link that says contact"
/// 3. Verify the second link was activated and followed
/// 4. Verify the other links were never touched
#[tokio::test]
async fn test_contact_us_link_resolved_among_three() {
    let (mut pipeline, ctx) = offline_pipeline();

    let report = say(&mut pipeline, ctx, "open link that says contact").await;

    assert!(report.succeeded());
    let page = pipeline.registry().page(ctx).unwrap();
    let page = page.lock().await;
    assert_eq!(page.url, "https://example.com/contact");

    let activated: Vec<_> = page
        .events
        .iter()
        .filter_map(|e| match e {
            voicepilot::page::PageEvent::Activated { label } => Some(label.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(activated, vec!["Contact Us".to_string()]);
}

/// Integration test: ordinal paragraph reading
///
/// 1. Page has five qualifying paragraphs
/// 2. Say "read the third paragraph"
/// 3. Verify the spoken text is paragraph index 2
#[tokio::test]
async fn test_read_third_paragraph_speaks_index_two() {
    let (mut pipeline, ctx) = offline_pipeline();

    let report = say(&mut pipeline, ctx, "read the third paragraph").await;

    assert!(report.succeeded());
    assert_eq!(
        report.command,
        Command::Read {
            target: ReadTarget::Paragraph,
            which_index: Some(2),
        }
    );
    let spoken = report.spoken.unwrap();
    assert!(spoken.starts_with("Paragraph number 3"), "spoke: {}", spoken);
}

/// Integration test: typing into a named field
#[tokio::test]
async fn test_type_into_search_field() {
    let (mut pipeline, ctx) = offline_pipeline();

    let report = say(&mut pipeline, ctx, "type rust async into search").await;

    assert!(report.succeeded());
    let page = pipeline.registry().page(ctx).unwrap();
    let page = page.lock().await;
    assert_eq!(page.fields[0].name, "search");
    assert_eq!(page.fields[0].value, "rust async");
}

/// Integration test: stop is idempotent
///
/// 1. Start a long read so something is playing
/// 2. Say "stop" twice in a row
/// 3. Verify both commands settle cleanly and nothing is playing
#[tokio::test]
async fn test_stop_twice_never_errors() {
    let (mut pipeline, ctx) = offline_pipeline();

    say(&mut pipeline, ctx, "read the page").await;
    assert!(pipeline.speech().active().is_some());

    let first = say(&mut pipeline, ctx, "stop").await;
    let second = say(&mut pipeline, ctx, "stop").await;

    assert!(first.succeeded());
    assert!(second.succeeded());
    assert_eq!(second.spoken, None);
    assert!(pipeline.speech().active().is_none());
}

/// Integration test: gibberish becomes a spoken "not understood"
#[tokio::test]
async fn test_unmatched_transcript_speaks_not_understood() {
    let (mut pipeline, ctx) = offline_pipeline();

    let report = say(&mut pipeline, ctx, "flibber the jabberwock").await;

    assert!(report.succeeded());
    assert_eq!(report.command, Command::Unknown);
    assert_eq!(
        report.spoken.as_deref(),
        Some("Sorry, I didn't understand that.")
    );
}

// ============================================================================
// Translator-Path Scenarios
// ============================================================================

/// Integration test: fenced JSON from the translator is accepted
///
/// 1. Script the translator to answer with a ```json fenced block
/// 2. Say something that only the translator understands
/// 3. Verify the fenced payload became the command
#[tokio::test]
async fn test_fenced_json_response_translates() {
    let (mut pipeline, ctx) =
        scripted_pipeline(["```json\n{\"action\": \"stop\"}\n```"]);

    let report = say(&mut pipeline, ctx, "please be quiet now").await;

    assert_eq!(report.command, Command::Stop);
    assert!(report.passed_through(Stage::Translated));
    assert!(!report.passed_through(Stage::FallbackParsing));
}

/// Integration test: a chatty non-JSON answer degrades transparently
///
/// 1. Script the translator to answer in prose
/// 2. Say "scroll down"
/// 3. Verify the fallback rules produced the command instead
/// 4. Verify the user saw no error, only the normal confirmation
#[tokio::test]
async fn test_non_json_response_falls_back_without_user_error() {
    let (mut pipeline, ctx) =
        scripted_pipeline(["Sure! I'll scroll that page for you right away."]);

    let report = say(&mut pipeline, ctx, "scroll down").await;

    assert!(report.succeeded());
    assert!(report.passed_through(Stage::TranslationFailed));
    assert!(report.passed_through(Stage::FallbackParsing));
    assert_eq!(
        report.command,
        Command::Scroll {
            direction: ScrollDirection::Down
        }
    );
    assert_eq!(report.spoken.as_deref(), Some("Scrolling down."));
}

/// Integration test: translator output with surrounding chatter still
/// parses when a single JSON object is embedded
#[tokio::test]
async fn test_embedded_json_with_chatter_translates() {
    let (mut pipeline, ctx) = scripted_pipeline(
        ["Here is the command you asked for: {\"action\":\"scroll\",\"direction\":\"top\"} Hope that helps!"],
    );

    let report = say(&mut pipeline, ctx, "back to the top please").await;

    assert_eq!(
        report.command,
        Command::Scroll {
            direction: ScrollDirection::Top
        }
    );
    assert_eq!(report.spoken.as_deref(), Some("Top of page."));
}

// ============================================================================
// Site-Strategy Scenarios
// ============================================================================

/// Integration test: a site strategy intercepts before translation
///
/// 1. Open a YouTube watch page; translator scripted with an empty
///    queue, so consulting it would show up as a translation failure
/// 2. Say "open shorts"
/// 3. Verify the strategy handled it and the translator never ran
#[tokio::test]
async fn test_site_strategy_intercepts_before_translator() {
    let mut pipeline = Pipeline::new(
        Some(IntentTranslator::scripted(Vec::<String>::new())),
        Arc::new(SpeechFeedback::new()),
        Arc::new(SummarizationService::scripted(Vec::<String>::new())),
    );
    let ctx = pipeline.open_context(PageDom::new("https://www.youtube.com/watch?v=abc"));

    let report = say(&mut pipeline, ctx, "open shorts").await;

    assert!(report.succeeded());
    assert!(report.passed_through(Stage::Intercepted));
    assert!(!report.passed_through(Stage::Translating));
    assert_eq!(report.strategy, Some("youtube"));

    let page = pipeline.registry().page(ctx).unwrap();
    assert_eq!(page.lock().await.url, "https://www.youtube.com/shorts");
}

/// Integration test: the same phrase off-site is not intercepted
#[tokio::test]
async fn test_strategy_phrase_ignored_off_site() {
    let (mut pipeline, ctx) = offline_pipeline();

    let report = say(&mut pipeline, ctx, "open shorts").await;

    assert!(!report.passed_through(Stage::Intercepted));
    assert_eq!(report.strategy, None);
}

// ============================================================================
// Summarization Round Trip
// ============================================================================

/// Integration test: summarize speaks the service's answer
///
/// 1. Script one canned summary
/// 2. Say "summarize this page"
/// 3. Verify the page text went out and the summary came back spoken
#[tokio::test]
async fn test_summarize_round_trip() {
    let mut pipeline = Pipeline::new(
        None,
        Arc::new(SpeechFeedback::new()),
        Arc::new(SummarizationService::scripted([
            "Rust adoption keeps growing.",
        ])),
    );
    let ctx = pipeline.open_context(article_page());

    let report = say(&mut pipeline, ctx, "summarize this page").await;

    assert!(report.succeeded());
    assert_eq!(
        report.command,
        Command::Summarize {
            target: ReadTarget::Page,
            which_index: None,
        }
    );
    assert_eq!(
        report.spoken.as_deref(),
        Some("Rust adoption keeps growing.")
    );
}

/// Integration test: summarization failure ends as a spoken apology
#[tokio::test]
async fn test_summarize_failure_is_spoken_apology() {
    // Offline pipeline has an empty scripted summary queue
    let (mut pipeline, ctx) = offline_pipeline();

    let report = say(&mut pipeline, ctx, "summarize this page").await;

    assert!(!report.succeeded());
    assert_eq!(
        report.spoken.as_deref(),
        Some("Sorry, I couldn't summarize that right now.")
    );
}

// ============================================================================
// Delivery and Recovery
// ============================================================================

/// Integration test: recovery executes the command exactly once
///
/// 1. Register a page whose executor was never installed
/// 2. Say "scroll down"
/// 3. Verify delivery recovered (install + resend) and the page
///    scrolled one step, not two
#[tokio::test]
async fn test_recovery_executes_exactly_once() {
    let mut pipeline = Pipeline::offline();
    let ctx = pipeline.registry_mut().register_page(article_page());
    assert!(!pipeline.registry().has_executor(ctx));

    let report = say(&mut pipeline, ctx, "scroll down").await;

    assert!(report.succeeded());
    assert!(pipeline.registry().has_executor(ctx));

    let page = pipeline.registry().page(ctx).unwrap();
    let offset = page.lock().await.scroll.offset;
    assert!((offset - 720.0).abs() < 0.01, "offset was {}", offset);
}

/// Integration test: a closed context exhausts the bounded retry
///
/// 1. Open a context, then close it (page and executor both gone)
/// 2. Say "scroll down"
/// 3. Verify the report ends in DeliveryFailed with a spoken line
#[tokio::test]
async fn test_closed_context_exhausts_retry() {
    let (mut pipeline, ctx) = offline_pipeline();
    pipeline.registry_mut().close_context(ctx);

    let report = say(&mut pipeline, ctx, "scroll down").await;

    assert!(!report.succeeded());
    assert_eq!(report.stages.last(), Some(&Stage::DeliveryFailed));
    assert_eq!(
        report.spoken.as_deref(),
        Some("I can't control this page right now.")
    );
}

// ============================================================================
// Envelope Front Door
// ============================================================================

/// Integration test: PROCESS_TEXT runs the whole pipeline
#[tokio::test]
async fn test_process_text_envelope_runs_pipeline() {
    let (mut pipeline, ctx) = offline_pipeline();

    let reply = pipeline
        .handle_envelope(
            ctx,
            Envelope::ProcessText {
                text: "scroll down".into(),
            },
        )
        .await;

    assert!(reply.is_success());
    assert_eq!(reply.message.as_deref(), Some("Scrolling down."));
}

/// Integration test: VOICE_COMMAND is interpreted at the endpoint
#[tokio::test]
async fn test_voice_command_envelope_executes_locally() {
    let (mut pipeline, ctx) = offline_pipeline();

    let reply = pipeline
        .handle_envelope(
            ctx,
            Envelope::VoiceCommand {
                text: "scroll to the bottom".into(),
            },
        )
        .await;

    assert!(reply.is_success());
    let page = pipeline.registry().page(ctx).unwrap();
    let page = page.lock().await;
    assert!((page.scroll.offset - page.scroll.max_offset()).abs() < 0.01);
}
