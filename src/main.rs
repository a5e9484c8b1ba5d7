//! Voicepilot - Entry Point
//!
//! Wires the full pipeline over a demo page and runs a small REPL:
//! each line you type stands in for a captured voice transcript, and
//! the program prints the stage trace, the resolved command, the page
//! effects, and what would have been spoken back.

use voicepilot::core::config::{set_config, PipelineConfig};
use voicepilot::core::error::{PilotError, Result};
use voicepilot::core::types::{ContextId, Transcript};
use voicepilot::llm::{IntentTranslator, LlmClient};
use voicepilot::page::PageDom;
use voicepilot::pipeline::{CommandReport, Pipeline};
use voicepilot::speech::{SpeechFeedback, Voice};
use voicepilot::summary::SummarizationService;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "voicepilot", about = "Voice-operated page automation pipeline")]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<String>,

    /// URL the demo page starts on
    #[arg(long, default_value = "https://example.com/articles/rust-in-production")]
    url: String,

    /// Run a single transcript non-interactively and exit
    #[arg(long)]
    transcript: Option<String>,
}

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("voicepilot=debug")
        .init();

    let args = Args::parse();

    if let Some(path) = &args.config {
        let config = PipelineConfig::load(Path::new(path)).map_err(PilotError::Config)?;
        if set_config(config).is_err() {
            tracing::warn!("config already initialized, ignoring --config");
        }
    }

    tracing::info!("voicepilot starting...");

    // Async runtime for translation, summarization, and delivery.
    // Entering it up front lets the registry spawn endpoint tasks.
    let rt = Runtime::new()?;
    let _guard = rt.enter();

    // Try to create the LLM client (optional - works without it)
    let llm_client = LlmClient::from_env().ok();
    if llm_client.is_none() {
        tracing::warn!("VOICEPILOT_API_KEY not set - translation disabled, fallback rules only");
    }

    let summarizer = Arc::new(match &llm_client {
        Some(client) => SummarizationService::remote(client.clone()),
        None => SummarizationService::scripted(Vec::<String>::new()),
    });
    let translator = llm_client.map(IntentTranslator::remote);
    let speech = Arc::new(SpeechFeedback::with_catalog(demo_voices()));

    let mut pipeline = Pipeline::new(translator, speech, summarizer);
    let ctx = pipeline.open_context(demo_page(&args.url));
    let mut seen_events = 0;

    // One-shot mode
    if let Some(text) = &args.transcript {
        run_transcript(&rt, &mut pipeline, ctx, text, &mut seen_events);
        return Ok(());
    }

    // Display welcome message
    println!("\n=== VOICEPILOT ===");
    println!("Type what you would say; the pipeline does the rest.");
    println!();
    println!("Try:");
    println!("  scroll down / scroll to the top");
    println!("  click on contact us");
    println!("  type rust async into search");
    println!("  read the third paragraph");
    println!("  summarize this page");
    println!("  find ownership");
    println!("  go back");
    println!("  stop");
    println!("  quit / q        - Exit");
    println!();

    // Main REPL loop
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break; // EOF
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }
        if input == "quit" || input == "q" {
            break;
        }

        run_transcript(&rt, &mut pipeline, ctx, input, &mut seen_events);
    }

    println!("Goodbye.");
    Ok(())
}

/// Feed one transcript through the pipeline and print everything
fn run_transcript(
    rt: &Runtime,
    pipeline: &mut Pipeline,
    ctx: ContextId,
    text: &str,
    seen_events: &mut usize,
) {
    let report = rt.block_on(pipeline.handle_transcript(&Transcript::new(text), ctx));
    print_report(&report);

    let Some(page) = pipeline.registry().page(ctx) else {
        return;
    };
    let snapshot = rt.block_on(async { page.lock().await.clone() });

    for event in &snapshot.events[*seen_events..] {
        println!("Effect:   {:?}", event);
    }
    *seen_events = snapshot.events.len();

    println!(
        "Page:     {}  (scroll {:.0}/{:.0})",
        snapshot.url,
        snapshot.scroll.offset,
        snapshot.scroll.max_offset()
    );
    println!();
}

fn print_report(report: &CommandReport) {
    println!();
    println!("Pipeline: {}", report.trace());
    if let Some(strategy) = report.strategy {
        println!("Strategy: {}", strategy);
    }
    println!("Command:  {:?}", report.command);
    match &report.spoken {
        Some(line) => println!("Spoken:   \"{}\"", line),
        None => println!("Spoken:   (silence)"),
    }
    if let Some(error) = &report.error {
        println!("Note:     {}", error);
    }
}

/// The voices a host would offer; selection prefers known-good names
fn demo_voices() -> Vec<Voice> {
    vec![
        Voice {
            id: "fr-amelie".into(),
            name: "Amelie".into(),
            language: "fr-FR".into(),
        },
        Voice {
            id: "en-us-google".into(),
            name: "Google US English".into(),
            language: "en-US".into(),
        },
        Voice {
            id: "en-gb-daniel".into(),
            name: "Daniel".into(),
            language: "en-GB".into(),
        },
    ]
}

/// An article-shaped demo page with enough furniture to exercise
/// every command
fn demo_page(url: &str) -> PageDom {
    let mut page = PageDom::new(url)
        .with_title("Rust in Production")
        .with_viewport(900.0, 5400.0);

    page.add_link("Home", "https://example.com/");
    page.add_link("Articles", "https://example.com/articles");
    page.add_link("Contact Us", "https://example.com/contact");
    page.add_button("Subscribe");
    page.add_field("search");
    page.add_field("email address");

    page.add_paragraph(
        "Rust has moved from a curiosity to a load-bearing part of production \
         stacks at companies of every size, and the trajectory shows no sign \
         of flattening.",
    );
    page.add_paragraph(
        "Teams consistently report that the borrow checker's up-front cost is \
         repaid within months by the near-total absence of memory-safety \
         incidents in their on-call rotations.",
    );
    page.add_paragraph(
        "The async ecosystem settled around a small number of mature runtimes, \
         which made long-lived network services the language's fastest-growing \
         niche.",
    );
    page.add_paragraph(
        "Hiring remains the most cited obstacle, though most teams find that \
         engineers coming from other systems languages are productive within \
         their first quarter.",
    );

    let article: Vec<String> = page.paragraphs.iter().map(|p| p.text.clone()).collect();
    page.article_text = Some(article.join("\n\n"));
    page
}
