// ABOUTME: Error types for the agent supervision core.
// ABOUTME: One variant per failure a session can end with; carried inside StreamEvent::Error.

use thiserror::Error;

/// Errors that can terminate a prompt session.
///
/// Every variant reaches the caller as exactly one `StreamEvent::Error`
/// on the session's event feed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// The backend name is not in the descriptor table.
    #[error("unknown backend: {0}")]
    UnknownBackend(String),

    /// None of the backend's candidate executables is on PATH.
    #[error("{display_name} CLI not found. {install_hint}")]
    NotFound {
        name: String,
        display_name: String,
        install_hint: String,
    },

    /// An attachment was supplied to a backend that cannot take one.
    #[error("backend '{0}' does not accept attachments")]
    UnsupportedAttachment(String),

    /// Writing the attachment to a temporary file failed.
    #[error("failed to stage attachment: {0}")]
    Staging(String),

    /// The OS refused to create the process.
    #[error("failed to spawn {name} CLI: {reason}")]
    Spawn { name: String, reason: String },

    /// The child exited with a non-zero status.
    #[error("{name} CLI error: {stderr}")]
    Process {
        name: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Reading the child's output failed.
    #[error("stream error from {name} CLI: {reason}")]
    Stream { name: String, reason: String },

    /// The request ran longer than the configured timeout.
    #[error("{name} CLI timed out after {secs} seconds")]
    Timeout { name: String, secs: u64 },
}

/// Fieldless category of an [`AgentError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnknownBackend,
    NotFound,
    UnsupportedAttachment,
    Staging,
    Spawn,
    Process,
    Stream,
    Timeout,
}

impl AgentError {
    /// Build a process error, substituting a generic message for empty stderr.
    pub fn process(name: impl Into<String>, code: Option<i32>, stderr: &str) -> Self {
        let stderr = stderr.trim();
        AgentError::Process {
            name: name.into(),
            code,
            stderr: if stderr.is_empty() {
                "unknown error".to_string()
            } else {
                stderr.to_string()
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::UnknownBackend(_) => ErrorKind::UnknownBackend,
            AgentError::NotFound { .. } => ErrorKind::NotFound,
            AgentError::UnsupportedAttachment(_) => ErrorKind::UnsupportedAttachment,
            AgentError::Staging(_) => ErrorKind::Staging,
            AgentError::Spawn { .. } => ErrorKind::Spawn,
            AgentError::Process { .. } => ErrorKind::Process,
            AgentError::Stream { .. } => ErrorKind::Stream,
            AgentError::Timeout { .. } => ErrorKind::Timeout,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
