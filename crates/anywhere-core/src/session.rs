// ABOUTME: Stream sessions: one submission, one background task, one ordered event feed
// ABOUTME: Orchestrates resolve -> stage -> build -> supervise and always ends with a terminal event

use crate::backend::{AgentRegistry, CommandBuilder, CommandLine};
use crate::config::Config;
use crate::error::{ErrorKind, Result};
use crate::mock;
use crate::staging::{AttachmentStaging, StagedAttachment};
use crate::supervisor::{Outcome, ProcessSupervisor, SupervisorSettings};
use crate::types::{PromptRequest, StreamEvent};
use futures::Stream;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const EVENT_BUFFER: usize = 100;

/// How a session's worker ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Finished,
    Failed(ErrorKind),
    Cancelled,
    /// The worker task panicked or was aborted.
    Aborted,
}

impl From<&Outcome> for SessionOutcome {
    fn from(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::Finished => SessionOutcome::Finished,
            Outcome::Failed(err) => SessionOutcome::Failed(err.kind()),
            Outcome::Cancelled => SessionOutcome::Cancelled,
        }
    }
}

/// Caller-side view of a running session.
///
/// Yields `Token`s followed by one terminal event. Once the session is
/// cancelled it yields nothing more, even if events were already buffered.
pub struct SessionHandle {
    agent: String,
    events: mpsc::Receiver<StreamEvent>,
    cancel: CancellationToken,
    worker: JoinHandle<SessionOutcome>,
    done: bool,
}

impl SessionHandle {
    pub fn agent(&self) -> &str {
        &self.agent
    }

    /// Request cancellation. Safe to call from any thread, any number of times.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Next event, or `None` after the terminal event or cancellation.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        futures::StreamExt::next(self).await
    }

    /// Wait for the worker to finish and release everything it owned.
    pub async fn wait(self) -> SessionOutcome {
        match self.worker.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(agent = %self.agent, error = %e, "Session worker failed");
                SessionOutcome::Aborted
            }
        }
    }

    /// Drain every event, then wait for the worker.
    pub async fn collect(mut self) -> (Vec<StreamEvent>, SessionOutcome) {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        let outcome = self.wait().await;
        (events, outcome)
    }
}

impl Stream for SessionHandle {
    type Item = StreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<StreamEvent>> {
        if self.done || self.cancel.is_cancelled() {
            return Poll::Ready(None);
        }
        match self.events.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                if event.is_terminal() {
                    self.done = true;
                }
                Poll::Ready(Some(event))
            }
            Poll::Ready(None) => {
                self.done = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Entry point for callers: submits prompts to backends.
pub struct StreamSession {
    registry: Arc<AgentRegistry>,
    staging: AttachmentStaging,
    settings: SupervisorSettings,
    mock_responses: bool,
    active: Mutex<Option<CancellationToken>>,
}

impl StreamSession {
    pub fn new(registry: AgentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            staging: AttachmentStaging::new(),
            settings: SupervisorSettings::default(),
            mock_responses: false,
            active: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config, registry: AgentRegistry) -> Self {
        Self::new(registry)
            .with_settings(config.supervisor_settings())
            .with_mock_responses(config.mock_responses)
    }

    pub fn with_settings(mut self, settings: SupervisorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_staging(mut self, staging: AttachmentStaging) -> Self {
        self.staging = staging;
        self
    }

    pub fn with_mock_responses(mut self, enabled: bool) -> Self {
        self.mock_responses = enabled;
        self
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Submit a prompt, cancelling the session previously started here.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, agent: &str, request: PromptRequest) -> SessionHandle {
        let cancel = CancellationToken::new();
        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(cancel.clone());
        if let Some(previous) = previous {
            tracing::debug!("Cancelling previous session");
            previous.cancel();
        }
        self.submit_with_token(agent, request, cancel)
    }

    /// Cancel the session most recently started with [`StreamSession::submit`].
    pub fn cancel_active(&self) {
        let active = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(token) = active {
            token.cancel();
        }
    }

    /// Submit with a caller-owned token. No single-session policy is applied.
    ///
    /// Must be called from within a tokio runtime.
    pub fn submit_with_token(
        &self,
        agent: &str,
        request: PromptRequest,
        cancel: CancellationToken,
    ) -> SessionHandle {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let job = SessionJob {
            registry: Arc::clone(&self.registry),
            staging: self.staging.clone(),
            settings: self.settings,
            mock_responses: self.mock_responses,
            agent: agent.to_string(),
            request,
            cancel: cancel.clone(),
        };
        let worker = tokio::spawn(job.run(tx));

        SessionHandle {
            agent: agent.to_string(),
            events: rx,
            cancel,
            worker,
            done: false,
        }
    }
}

struct SessionJob {
    registry: Arc<AgentRegistry>,
    staging: AttachmentStaging,
    settings: SupervisorSettings,
    mock_responses: bool,
    agent: String,
    request: PromptRequest,
    cancel: CancellationToken,
}

struct Prepared {
    command: CommandLine,
    attachment: Option<StagedAttachment>,
}

impl SessionJob {
    async fn run(self, events: mpsc::Sender<StreamEvent>) -> SessionOutcome {
        let outcome = if self.mock_responses {
            self.run_mock(&events).await
        } else {
            self.run_backend(&events).await
        };

        if let Some(event) = outcome.terminal_event() {
            tokio::select! {
                _ = self.cancel.cancelled() => {}
                _ = events.send(event) => {}
            }
        }

        let summary = SessionOutcome::from(&outcome);
        tracing::info!(agent = %self.agent, outcome = ?summary, "Session ended");
        summary
    }

    async fn run_mock(&self, events: &mpsc::Sender<StreamEvent>) -> Outcome {
        let checked = self.registry.descriptor(&self.agent).and_then(|descriptor| {
            CommandBuilder::check_attachment(descriptor, self.request.has_attachment())
        });
        if let Err(e) = checked {
            return Outcome::Failed(e);
        }
        mock::stream_mock(&self.request, &self.cancel, events).await
    }

    /// Returns once the attachment, if any, has been released.
    async fn run_backend(&self, events: &mpsc::Sender<StreamEvent>) -> Outcome {
        let Prepared {
            command,
            attachment,
        } = match self.prepare() {
            Ok(prepared) => prepared,
            Err(e) => {
                tracing::info!(agent = %self.agent, error = %e, "Session failed before spawn");
                return Outcome::Failed(e);
            }
        };

        let outcome = if self.cancel.is_cancelled() {
            Outcome::Cancelled
        } else {
            let mut supervisor = ProcessSupervisor::new(self.agent.clone(), self.settings);
            supervisor.run(&command, &self.cancel, events).await
        };

        if let Some(attachment) = attachment {
            attachment.release();
        }
        outcome
    }

    /// Everything up to the spawn. Any staged file is dropped, and so
    /// removed, if a later step fails.
    fn prepare(&self) -> Result<Prepared> {
        let descriptor = self.registry.descriptor(&self.agent)?;
        CommandBuilder::check_attachment(descriptor, self.request.has_attachment())?;

        let resolved = self.registry.resolve(&self.agent)?;
        let attachment = self
            .request
            .attachment
            .as_deref()
            .map(|bytes| self.staging.stage(bytes))
            .transpose()?;
        let command = CommandBuilder::build(&resolved, &self.request, attachment.as_ref())?;

        Ok(Prepared {
            command,
            attachment,
        })
    }
}

/// Submit with a caller-owned token against `registry`, with default settings.
pub fn submit(
    registry: AgentRegistry,
    agent: &str,
    request: PromptRequest,
    cancel: CancellationToken,
) -> SessionHandle {
    StreamSession::new(registry).submit_with_token(agent, request, cancel)
}
