// ABOUTME: Core library for prompt-anywhere - backend resolution, process supervision, streaming
// ABOUTME: Shared by the desktop shell and the `anywhere` CLI

//! Hands a prompt (optionally with an image) to an installed AI CLI and
//! streams its output back as ordered events.
//!
//! ```no_run
//! use anywhere_core::{AgentRegistry, PromptRequest, StreamEvent, StreamSession};
//!
//! # async fn demo() {
//! let session = StreamSession::new(AgentRegistry::builtin());
//! let mut handle = session.submit("codex", PromptRequest::new("explain borrowck"));
//! while let Some(event) = handle.next_event().await {
//!     match event {
//!         StreamEvent::Token(line) => println!("{line}"),
//!         StreamEvent::Final => break,
//!         StreamEvent::Error(e) => eprintln!("{e}"),
//!     }
//! }
//! # }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod mock;
pub mod session;
pub mod staging;
pub mod supervisor;
pub mod types;

pub use backend::{
    AgentAvailability, AgentDescriptor, AgentRegistry, ArgvStyle, CommandBuilder, CommandLine,
    ResolvedAgent,
};
pub use config::Config;
pub use error::{AgentError, ErrorKind};
pub use session::{submit, SessionHandle, SessionOutcome, StreamSession};
pub use staging::{AttachmentStaging, StagedAttachment};
pub use supervisor::{Outcome, ProcessSupervisor, SupervisorSettings, SupervisorState};
pub use tokio_util::sync::CancellationToken;
pub use types::{PromptRequest, StreamEvent};
