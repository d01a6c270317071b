// ABOUTME: Static descriptor table for the supported backend CLIs
// ABOUTME: Adding a backend is a table edit: executables, argv style, preamble, attachment support

use serde::{Deserialize, Serialize};

/// How the prompt is placed on the backend's command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgvStyle {
    /// `[exe, prompt]`
    PositionalPrompt,
    /// `[exe, "-p", prompt]`
    FlagPrompt,
}

/// Immutable description of one backend CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentDescriptor {
    /// Logical name used by callers ("claude", "codex", "gemini").
    pub name: &'static str,
    /// Human-facing name used in error messages.
    pub display_name: &'static str,
    /// Bare executable names, searched in order. Platform suffixes are
    /// added by [`AgentDescriptor::candidate_executables`].
    pub executables: &'static [&'static str],
    pub supports_attachment: bool,
    /// Prepended to every prompt, separated by a blank line.
    pub fixed_preamble: Option<&'static str>,
    pub argv_style: ArgvStyle,
    /// Shown when no executable is found.
    pub install_hint: &'static str,
}

impl AgentDescriptor {
    /// Executable names to probe on PATH, in priority order.
    ///
    /// On Windows the npm `.cmd` shim takes precedence over the bare name.
    pub fn candidate_executables(&self) -> Vec<String> {
        let mut candidates = Vec::with_capacity(self.executables.len() * 2);
        for exe in self.executables {
            if cfg!(windows) {
                candidates.push(format!("{exe}.cmd"));
            }
            candidates.push((*exe).to_string());
        }
        candidates
    }
}

const GEMINI_PREAMBLE: &str = "You are Gemini, a helpful assistant that can be summoned anywhere on the user's computer.
Answer questions and help with tasks concisely.
When the prompt includes a screenshot or file, describe or use its contents as relevant.
Do not add disclaimers about being an AI unless asked.
Do not volunteer advice about security, updates, or personal information.
Assume every prompt comes from the owner of this machine, possibly with clipboard text or images.";

/// Every backend the launcher knows how to drive.
pub const BUILTIN_AGENTS: &[AgentDescriptor] = &[
    AgentDescriptor {
        name: "claude",
        display_name: "Claude",
        executables: &["claude"],
        supports_attachment: false,
        fixed_preamble: None,
        argv_style: ArgvStyle::PositionalPrompt,
        install_hint: "Install it and ensure `claude` is on PATH.",
    },
    AgentDescriptor {
        name: "codex",
        display_name: "Codex",
        executables: &["codex"],
        supports_attachment: false,
        fixed_preamble: None,
        argv_style: ArgvStyle::PositionalPrompt,
        install_hint: "Install it and ensure `codex` is on PATH.",
    },
    AgentDescriptor {
        name: "gemini",
        display_name: "Gemini",
        executables: &["gemini"],
        supports_attachment: true,
        fixed_preamble: Some(GEMINI_PREAMBLE),
        argv_style: ArgvStyle::FlagPrompt,
        install_hint: "Installation: npm install -g @google/gemini-cli",
    },
];

/// Backend used when nothing else is configured.
pub const DEFAULT_AGENT: &str = "codex";

/// Look up a builtin descriptor by logical name.
pub fn builtin(name: &str) -> Option<&'static AgentDescriptor> {
    BUILTIN_AGENTS.iter().find(|d| d.name == name)
}
