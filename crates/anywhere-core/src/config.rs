// ABOUTME: Configuration loading and management for prompt-anywhere
// ABOUTME: TOML file in the XDG config dir with defaults for every field

use crate::backend::{AgentRegistry, DEFAULT_AGENT};
use crate::error::AgentError;
use crate::supervisor::SupervisorSettings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend used when the caller does not name one
    pub default_agent: String,
    /// Stream canned text instead of spawning a backend
    pub mock_responses: bool,
    /// Child process timing
    pub process: ProcessConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_agent: DEFAULT_AGENT.to_string(),
            mock_responses: false,
            process: ProcessConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Time between the terminate request and a forced kill
    pub grace_period_ms: u64,
    /// Hard bound on waiting for a killed child
    pub kill_timeout_ms: u64,
    /// Whole-request timeout in seconds (none if unset)
    pub timeout_secs: Option<u64>,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 2000,
            kill_timeout_ms: 2000,
            timeout_secs: None,
        }
    }
}

impl From<&ProcessConfig> for SupervisorSettings {
    fn from(config: &ProcessConfig) -> Self {
        SupervisorSettings {
            grace_period: Duration::from_millis(config.grace_period_ms),
            kill_timeout: Duration::from_millis(config.kill_timeout_ms),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl Config {
    /// Get the XDG config directory (~/.config/prompt-anywhere)
    pub fn config_dir() -> PathBuf {
        // Respect XDG_CONFIG_HOME if set, otherwise use ~/.config
        std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .map(|p| p.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("."))
            })
            .join("prompt-anywhere")
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load config from XDG config directory
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            // No config found, use defaults
            Ok(Self::default())
        }
    }

    /// Load config from a specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        Ok(config)
    }

    /// Write config to a specific path, creating parent directories
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config dir: {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Switch the default backend. Unknown names leave the config unchanged.
    pub fn set_default_agent(
        &mut self,
        name: &str,
        registry: &AgentRegistry,
    ) -> std::result::Result<(), AgentError> {
        registry.descriptor(name)?;
        self.default_agent = name.to_string();
        Ok(())
    }

    pub fn supervisor_settings(&self) -> SupervisorSettings {
        SupervisorSettings::from(&self.process)
    }

    /// Generate a default config file content
    pub fn default_toml() -> String {
        format!(
            r#"# prompt-anywhere configuration
# Location: ~/.config/prompt-anywhere/config.toml

# Backend used when none is selected: claude, codex, or gemini
default_agent = "{DEFAULT_AGENT}"

# Stream canned responses instead of calling a backend (UI testing)
mock_responses = false

[process]
# Milliseconds a cancelled backend gets to exit before it is killed
grace_period_ms = 2000
# Milliseconds to wait for a killed backend to be reaped
kill_timeout_ms = 2000
# timeout_secs = 300  # Give up on a request after this many seconds
"#
        )
    }

    /// Initialize config directory and create default config if needed
    pub fn init() -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_path();

        std::fs::create_dir_all(&config_dir)
            .with_context(|| format!("Failed to create config dir: {}", config_dir.display()))?;

        // Write default config if it doesn't exist
        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_toml())
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Ok(config_path)
    }
}
