// ABOUTME: Pure argv construction for a resolved backend invocation
// ABOUTME: Applies preamble, argv style, inline @path attachments, and batch-script line folding

use super::descriptor::{AgentDescriptor, ArgvStyle};
use super::registry::ResolvedAgent;
use crate::error::{AgentError, Result};
use crate::staging::StagedAttachment;
use crate::types::PromptRequest;
use std::path::Path;

/// Everything the supervisor needs to spawn one backend process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Program followed by its arguments.
    pub argv: Vec<String>,
    /// Suppress the console window on platforms that would show one.
    pub needs_hidden_window: bool,
}

impl CommandLine {
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or_default()
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }
}

/// Builds backend command lines. Performs no I/O.
pub struct CommandBuilder;

impl CommandBuilder {
    /// Reject an attachment for a backend that cannot take one.
    pub fn check_attachment(descriptor: &AgentDescriptor, has_attachment: bool) -> Result<()> {
        if has_attachment && !descriptor.supports_attachment {
            return Err(AgentError::UnsupportedAttachment(descriptor.name.to_string()));
        }
        Ok(())
    }

    pub fn build(
        resolved: &ResolvedAgent,
        prompt: &PromptRequest,
        attachment: Option<&StagedAttachment>,
    ) -> Result<CommandLine> {
        let descriptor = &resolved.descriptor;
        Self::check_attachment(descriptor, attachment.is_some())?;

        let mut prompt_arg = full_prompt_text(descriptor, &prompt.text);
        if let Some(staged) = attachment {
            prompt_arg.push_str(" @");
            prompt_arg.push_str(&staged.path().to_string_lossy());
        }

        // Batch scripts are spawned directly so the platform escapes their
        // arguments for cmd.exe. A cmd.exe argument cannot hold a line break.
        if is_batch_script(&resolved.executable) {
            prompt_arg = fold_line_breaks(&prompt_arg);
        }

        let executable = resolved.executable.to_string_lossy().into_owned();
        let argv = match descriptor.argv_style {
            ArgvStyle::PositionalPrompt => vec![executable, prompt_arg],
            ArgvStyle::FlagPrompt => vec![executable, "-p".to_string(), prompt_arg],
        };

        // All backends are console programs.
        Ok(CommandLine {
            argv,
            needs_hidden_window: true,
        })
    }
}

/// Prompt text with the descriptor's preamble, if any.
pub fn full_prompt_text(descriptor: &AgentDescriptor, text: &str) -> String {
    match descriptor.fixed_preamble {
        Some(preamble) => format!("{preamble}\n\n{text}"),
        None => text.to_string(),
    }
}

fn is_batch_script(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("cmd") || ext.eq_ignore_ascii_case("bat"))
        .unwrap_or(false)
}

/// Collapse each run of line breaks into one space.
fn fold_line_breaks(text: &str) -> String {
    text.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
