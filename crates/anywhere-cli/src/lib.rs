// ABOUTME: CLI library components for the `anywhere` binary
// ABOUTME: Rendering and input helpers shared by the subcommands

//! # anywhere-cli
//!
//! ```text
//! anywhere
//! ├── ask [-a NAME] [--attach FILE] [--mock] PROMPT...   # Stream an answer
//! ├── agents                                             # Installed backends
//! ├── use <name>                                         # Set default backend
//! ├── init                                               # Write default config
//! └── version
//! ```

use anyhow::{bail, Context, Result};
use anywhere_core::{AgentAvailability, PromptRequest};
use std::path::Path;

/// Version of the anywhere CLI
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the request from the prompt words and an optional attachment file.
pub fn build_request(words: &[String], attach: Option<&Path>) -> Result<PromptRequest> {
    let text = words.join(" ");
    if text.trim().is_empty() {
        bail!("Prompt is empty");
    }

    let mut request = PromptRequest::new(text);
    if let Some(path) = attach {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read attachment: {}", path.display()))?;
        request = request.with_attachment(bytes);
    }
    Ok(request)
}

/// One row per backend: marker, name, display name, resolved path.
pub fn format_availability(rows: &[AgentAvailability], default_agent: &str) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = if row.name == default_agent { "*" } else { " " };
        let location = match &row.executable {
            Some(path) => path.display().to_string(),
            None => "(not installed)".to_string(),
        };
        out.push_str(&format!(
            "{marker} {:<8} {:<8} {location}\n",
            row.name, row.display_name
        ));
    }
    out
}
