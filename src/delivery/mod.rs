//! Delivery of commands to per-context executor endpoints
//!
//! Endpoints are NOT assumed alive. The page behind a context can
//! reload or lose its injected executor at any time, so every delivery
//! is an attempt: the router retries exactly once after reinstalling
//! the executor, then gives up with a typed error. Each endpoint owns
//! its page behind an async mutex and drains its queue in order, so
//! commands for one context never interleave.

pub mod endpoint;

pub use endpoint::spawn_endpoint;

use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::command::model::Command;
use crate::core::error::DeliveryError;
use crate::core::types::ContextId;
use crate::exec::{CommandExecutor, ExecutionReport};
use crate::page::PageDom;
use crate::speech::SpeechFeedback;
use crate::summary::SummarizationService;

// === WIRE FORMAT ===

/// Message sent to an executor endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Envelope {
    /// Raw transcript for the translation stage; never sent to
    /// endpoints, they reject it
    #[serde(rename = "PROCESS_TEXT")]
    ProcessText { text: String },

    /// A translated command for the endpoint to execute
    #[serde(rename = "EXECUTE_COMMAND")]
    ExecuteCommand { command: Command },

    /// Text the endpoint should have summarized on the caller's behalf
    #[serde(rename = "GENERATE_SUMMARY")]
    GenerateSummary { text: String },

    /// Raw transcript the endpoint interprets locally with the
    /// fallback rules, bypassing the translation stage
    #[serde(rename = "VOICE_COMMAND")]
    VoiceCommand { text: String },
}

/// Acknowledgement returned by an endpoint for each envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopeReply {
    pub status: ReplyStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    Success,
    Error,
}

impl EnvelopeReply {
    pub fn success(message: Option<String>) -> Self {
        Self {
            status: ReplyStatus::Success,
            message,
            summary: None,
        }
    }

    pub fn summary(summary: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Success,
            message: None,
            summary: Some(summary.into()),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ReplyStatus::Error,
            message: Some(message.into()),
            summary: None,
        }
    }

    /// Fold an execution outcome into a reply
    pub fn from_report(report: &ExecutionReport) -> Self {
        match &report.error {
            None => Self::success(report.spoken.clone()),
            Some(error) => Self::error(error.clone()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, ReplyStatus::Success)
    }
}

// === DELIVERY TRACKING ===

/// One delivery of a command toward a context
#[derive(Debug, Clone)]
pub struct DeliveryAttempt {
    pub command: Command,
    pub target: ContextId,
    /// 1 on first send, 2 on the post-reinstall resend
    pub attempt: u8,
}

impl DeliveryAttempt {
    pub fn first(command: Command, target: ContextId) -> Self {
        Self {
            command,
            target,
            attempt: 1,
        }
    }

    pub fn retry(command: Command, target: ContextId) -> Self {
        Self {
            command,
            target,
            attempt: 2,
        }
    }

    pub fn is_retry(&self) -> bool {
        self.attempt > 1
    }
}

// === ENDPOINTS ===

/// Request travelling over an endpoint channel
pub type EndpointRequest = (Envelope, oneshot::Sender<EnvelopeReply>);

/// Sender half of a live endpoint's queue
#[derive(Clone)]
pub struct EndpointHandle {
    tx: mpsc::Sender<EndpointRequest>,
}

impl EndpointHandle {
    pub fn new(tx: mpsc::Sender<EndpointRequest>) -> Self {
        Self { tx }
    }

    /// Send one envelope and wait for the acknowledgement
    ///
    /// Returns None when the endpoint task is gone, either because the
    /// queue is closed or because the task dropped the reply sender.
    pub async fn call(&self, envelope: Envelope) -> Option<EnvelopeReply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx.send((envelope, reply_tx)).await.ok()?;
        reply_rx.await.ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Tracks which contexts have pages and which have live executors
///
/// A context can hold a page without an executor, matching a document
/// that exists but whose executor was never installed or has since
/// died. install_executor closes that gap on demand.
pub struct DeliveryRegistry {
    endpoints: AHashMap<ContextId, EndpointHandle>,
    pages: AHashMap<ContextId, Arc<Mutex<PageDom>>>,
    speech: Arc<SpeechFeedback>,
    summarizer: Arc<SummarizationService>,
}

impl DeliveryRegistry {
    pub fn new(speech: Arc<SpeechFeedback>, summarizer: Arc<SummarizationService>) -> Self {
        Self {
            endpoints: AHashMap::new(),
            pages: AHashMap::new(),
            speech,
            summarizer,
        }
    }

    /// Register a page and spawn its executor endpoint
    pub fn open_context(&mut self, page: PageDom) -> ContextId {
        let ctx = ContextId::new();
        let page = Arc::new(Mutex::new(page));
        let handle = spawn_endpoint(
            Arc::clone(&page),
            Arc::clone(&self.speech),
            Arc::clone(&self.summarizer),
        );
        self.pages.insert(ctx, page);
        self.endpoints.insert(ctx, handle);
        tracing::debug!(?ctx, "context opened with executor");
        ctx
    }

    /// Register a page with no executor attached
    pub fn register_page(&mut self, page: PageDom) -> ContextId {
        let ctx = ContextId::new();
        self.pages.insert(ctx, Arc::new(Mutex::new(page)));
        tracing::debug!(?ctx, "page registered without executor");
        ctx
    }

    /// Spawn a fresh executor endpoint over the context's page
    ///
    /// Replaces any dead handle. Returns false when the context has no
    /// page to attach to.
    pub fn install_executor(&mut self, ctx: ContextId) -> bool {
        let Some(page) = self.pages.get(&ctx) else {
            return false;
        };
        let handle = spawn_endpoint(
            Arc::clone(page),
            Arc::clone(&self.speech),
            Arc::clone(&self.summarizer),
        );
        self.endpoints.insert(ctx, handle);
        tracing::debug!(?ctx, "executor installed");
        true
    }

    /// Detach the executor, leaving the page in place
    pub fn drop_executor(&mut self, ctx: ContextId) {
        self.endpoints.remove(&ctx);
    }

    /// Forget the context entirely, page and executor both
    pub fn close_context(&mut self, ctx: ContextId) {
        self.endpoints.remove(&ctx);
        self.pages.remove(&ctx);
        tracing::debug!(?ctx, "context closed");
    }

    pub fn has_executor(&self, ctx: ContextId) -> bool {
        self.endpoints
            .get(&ctx)
            .map(|h| !h.is_closed())
            .unwrap_or(false)
    }

    pub fn page(&self, ctx: ContextId) -> Option<Arc<Mutex<PageDom>>> {
        self.pages.get(&ctx).cloned()
    }

    /// Deliver one envelope to the context's endpoint
    pub async fn send(
        &self,
        ctx: ContextId,
        envelope: Envelope,
    ) -> Result<EnvelopeReply, DeliveryError> {
        let handle = self
            .endpoints
            .get(&ctx)
            .ok_or(DeliveryError::TargetUnreachable(ctx))?;
        handle
            .call(envelope)
            .await
            .ok_or(DeliveryError::TargetUnreachable(ctx))
    }
}

// === ROUTING ===

/// Routes commands to contexts with bounded recovery
pub struct CommandRouter;

impl CommandRouter {
    /// Deliver a command, reinstalling the executor at most once
    pub async fn route(
        registry: &mut DeliveryRegistry,
        target: ContextId,
        command: Command,
    ) -> Result<EnvelopeReply, DeliveryError> {
        // Top-level navigation is handled here: leaving a page must
        // work even when that page's executor is dead.
        if let Command::Navigate {
            to: None,
            url: Some(url),
        } = &command
        {
            if url.starts_with("http") {
                return Self::navigate_direct(registry, target, url).await;
            }
        }

        let attempt = DeliveryAttempt::first(command.clone(), target);
        tracing::debug!(
            ctx = ?attempt.target,
            attempt = attempt.attempt,
            action = attempt.command.name(),
            "delivering command"
        );

        match registry
            .send(
                target,
                Envelope::ExecuteCommand {
                    command: command.clone(),
                },
            )
            .await
        {
            Ok(reply) => Ok(reply),
            Err(DeliveryError::TargetUnreachable(_)) => {
                tracing::warn!(ctx = ?target, "executor unreachable, reinstalling");
                if !registry.install_executor(target) {
                    return Err(DeliveryError::RetryExhausted(target));
                }

                let attempt = DeliveryAttempt::retry(command, target);
                tracing::debug!(
                    ctx = ?attempt.target,
                    attempt = attempt.attempt,
                    action = attempt.command.name(),
                    "redelivering command"
                );
                registry
                    .send(
                        target,
                        Envelope::ExecuteCommand {
                            command: attempt.command,
                        },
                    )
                    .await
                    .map_err(|_| DeliveryError::RetryExhausted(target))
            }
            Err(e) => Err(e),
        }
    }

    async fn navigate_direct(
        registry: &DeliveryRegistry,
        target: ContextId,
        url: &str,
    ) -> Result<EnvelopeReply, DeliveryError> {
        let page = registry
            .page(target)
            .ok_or(DeliveryError::TargetUnreachable(target))?;
        let mut page = page.lock().await;
        let report = CommandExecutor::execute(
            &mut page,
            &registry.speech,
            &registry.summarizer,
            &Command::navigate_url(url),
        )
        .await;
        Ok(EnvelopeReply::from_report(&report))
    }
}
