// ABOUTME: Request and event types exchanged between the caller and the core
// ABOUTME: PromptRequest goes in, an ordered sequence of StreamEvents comes out

use crate::error::AgentError;

/// One prompt submission. Consumed by the session that runs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptRequest {
    pub text: String,
    /// In-memory binary context such as a screenshot.
    pub attachment: Option<Vec<u8>>,
}

impl PromptRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, bytes: Vec<u8>) -> Self {
        self.attachment = Some(bytes);
        self
    }

    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }
}

/// Events emitted by a session, in order: zero or more `Token`, then exactly
/// one `Final` or `Error`. A cancelled session simply stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One line of backend output, without its line terminator.
    Token(String),
    /// The backend exited successfully.
    Final,
    /// The session failed.
    Error(AgentError),
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Token(_))
    }
}
