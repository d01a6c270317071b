// ABOUTME: Backend descriptors, PATH resolution, and command construction
// ABOUTME: Data-driven: one table entry per CLI, no per-backend types

mod command;
mod descriptor;
mod registry;

pub use command::{full_prompt_text, CommandBuilder, CommandLine};
pub use descriptor::{builtin, AgentDescriptor, ArgvStyle, BUILTIN_AGENTS, DEFAULT_AGENT};
pub use registry::{AgentAvailability, AgentRegistry, ResolvedAgent};
