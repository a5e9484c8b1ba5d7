//! The per-context executor endpoint task
//!
//! One task per context drains a bounded queue of envelopes and
//! executes them against the context's page. The queue is the ordering
//! guarantee: envelopes for a context are handled strictly in arrival
//! order, and the reply for each is sent before the next is taken.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::command::fallback::FallbackInterpreter;
use crate::delivery::{EndpointHandle, EndpointRequest, Envelope, EnvelopeReply};
use crate::exec::CommandExecutor;
use crate::page::PageDom;
use crate::speech::SpeechFeedback;
use crate::summary::SummarizationService;

/// Envelopes a context can have in flight before senders wait
const ENDPOINT_QUEUE: usize = 32;

/// Spawn the endpoint task for one page
pub fn spawn_endpoint(
    page: Arc<Mutex<PageDom>>,
    speech: Arc<SpeechFeedback>,
    summarizer: Arc<SummarizationService>,
) -> EndpointHandle {
    let (tx, mut rx) = mpsc::channel::<EndpointRequest>(ENDPOINT_QUEUE);

    tokio::spawn(async move {
        while let Some((envelope, reply_tx)) = rx.recv().await {
            let reply = handle_envelope(&page, &speech, &summarizer, envelope).await;
            // A caller that stopped waiting is not the endpoint's problem
            let _ = reply_tx.send(reply);
        }
        tracing::debug!("endpoint task finished");
    });

    EndpointHandle::new(tx)
}

async fn handle_envelope(
    page: &Mutex<PageDom>,
    speech: &SpeechFeedback,
    summarizer: &SummarizationService,
    envelope: Envelope,
) -> EnvelopeReply {
    match envelope {
        Envelope::ExecuteCommand { command } => {
            let mut page = page.lock().await;
            let report = CommandExecutor::execute(&mut page, speech, summarizer, &command).await;
            EnvelopeReply::from_report(&report)
        }

        Envelope::VoiceCommand { text } => {
            // Local interpretation: the transcript never went through
            // the translation stage, so run the fallback rules here.
            let command = FallbackInterpreter::interpret(&text);
            tracing::debug!(action = command.name(), "voice command interpreted locally");
            let mut page = page.lock().await;
            let report = CommandExecutor::execute(&mut page, speech, summarizer, &command).await;
            EnvelopeReply::from_report(&report)
        }

        Envelope::GenerateSummary { text } => match summarizer.summarize(&text).await {
            Ok(summary) => EnvelopeReply::summary(summary),
            Err(e) => EnvelopeReply::error(e.to_string()),
        },

        Envelope::ProcessText { .. } => {
            EnvelopeReply::error("PROCESS_TEXT is handled before delivery")
        }
    }
}
