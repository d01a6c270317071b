// ABOUTME: Agent registry resolving logical backend names to executables on PATH
// ABOUTME: Probes candidates in order on every call; never caches misses

use super::descriptor::{AgentDescriptor, BUILTIN_AGENTS};
use crate::error::{AgentError, Result};
use std::ffi::OsString;
use std::path::PathBuf;

/// A descriptor paired with the executable that was found for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAgent {
    pub descriptor: AgentDescriptor,
    pub executable: PathBuf,
}

/// Availability of one backend, for capability checks in the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentAvailability {
    pub name: &'static str,
    pub display_name: &'static str,
    pub executable: Option<PathBuf>,
}

impl AgentAvailability {
    pub fn is_available(&self) -> bool {
        self.executable.is_some()
    }
}

/// Registry of backend descriptors.
///
/// Resolution searches the process PATH unless a search path was set with
/// [`AgentRegistry::with_search_path`].
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    descriptors: Vec<AgentDescriptor>,
    search_path: Option<OsString>,
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AgentRegistry {
    /// Registry over the builtin descriptor table.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_AGENTS.to_vec())
    }

    pub fn new(descriptors: Vec<AgentDescriptor>) -> Self {
        Self {
            descriptors,
            search_path: None,
        }
    }

    /// Search `path` (PATH syntax) instead of the process PATH.
    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    /// Get a descriptor by logical name.
    pub fn descriptor(&self, name: &str) -> Result<&AgentDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| AgentError::UnknownBackend(name.to_string()))
    }

    /// List all configured backend names, in table order.
    pub fn names(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(|d| d.name).collect()
    }

    /// Resolve `name` to the first candidate executable found on the search path.
    pub fn resolve(&self, name: &str) -> Result<ResolvedAgent> {
        let descriptor = self.descriptor(name)?;
        match self.find_executable(descriptor) {
            Some(executable) => {
                tracing::debug!(agent = %name, path = %executable.display(), "Resolved backend");
                Ok(ResolvedAgent {
                    descriptor: descriptor.clone(),
                    executable,
                })
            }
            None => {
                tracing::debug!(agent = %name, "Backend not found on PATH");
                Err(AgentError::NotFound {
                    name: descriptor.name.to_string(),
                    display_name: descriptor.display_name.to_string(),
                    install_hint: descriptor.install_hint.to_string(),
                })
            }
        }
    }

    /// Same search as [`AgentRegistry::resolve`], without an error.
    pub fn is_available(&self, name: &str) -> bool {
        self.descriptor(name)
            .map(|d| self.find_executable(d).is_some())
            .unwrap_or(false)
    }

    /// Probe every backend.
    pub fn availability(&self) -> Vec<AgentAvailability> {
        self.descriptors
            .iter()
            .map(|d| AgentAvailability {
                name: d.name,
                display_name: d.display_name,
                executable: self.find_executable(d),
            })
            .collect()
    }

    fn find_executable(&self, descriptor: &AgentDescriptor) -> Option<PathBuf> {
        descriptor
            .candidate_executables()
            .into_iter()
            .find_map(|candidate| self.which(&candidate))
    }

    fn which(&self, binary: &str) -> Option<PathBuf> {
        match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(binary, Some(paths), cwd).ok()
            }
            None => which::which(binary).ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::descriptor::ArgvStyle;

    #[cfg(unix)]
    fn install_stub(dir: &std::path::Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, "#!/bin/sh\necho stub\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_builtin_names() {
        let registry = AgentRegistry::builtin();
        assert_eq!(registry.names(), vec!["claude", "codex", "gemini"]);
    }

    #[test]
    fn test_unknown_backend() {
        let registry = AgentRegistry::builtin();
        let err = registry.resolve("llama").unwrap_err();
        assert_eq!(err, AgentError::UnknownBackend("llama".to_string()));
        assert!(!registry.is_available("llama"));
    }

    #[test]
    fn test_not_found_names_backend() {
        let empty = tempfile::tempdir().unwrap();
        let registry = AgentRegistry::builtin().with_search_path(empty.path());

        let err = registry.resolve("gemini").unwrap_err();
        match &err {
            AgentError::NotFound { name, .. } => assert_eq!(name, "gemini"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
        assert!(err.to_string().contains("Gemini CLI not found"));
        assert!(err.to_string().contains("npm install -g @google/gemini-cli"));
        assert!(!registry.is_available("gemini"));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_finds_stub() {
        let dir = tempfile::tempdir().unwrap();
        let stub = install_stub(dir.path(), "codex");
        let registry = AgentRegistry::builtin().with_search_path(dir.path());

        let resolved = registry.resolve("codex").unwrap();
        assert_eq!(resolved.executable, stub);
        assert_eq!(resolved.descriptor.name, "codex");
        assert!(registry.is_available("codex"));
        assert!(!registry.is_available("claude"));
    }

    #[cfg(unix)]
    #[test]
    fn test_candidates_searched_in_order() {
        let dir = tempfile::tempdir().unwrap();
        install_stub(dir.path(), "second");
        let first = install_stub(dir.path(), "first");
        let registry = AgentRegistry::new(vec![AgentDescriptor {
            name: "dual",
            display_name: "Dual",
            executables: &["first", "second"],
            supports_attachment: false,
            fixed_preamble: None,
            argv_style: ArgvStyle::PositionalPrompt,
            install_hint: "",
        }])
        .with_search_path(dir.path());

        assert_eq!(registry.resolve("dual").unwrap().executable, first);
    }

    #[cfg(unix)]
    #[test]
    fn test_misses_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let registry = AgentRegistry::builtin().with_search_path(dir.path());
        assert!(!registry.is_available("claude"));

        install_stub(dir.path(), "claude");
        assert!(registry.is_available("claude"));
    }

    #[cfg(unix)]
    #[test]
    fn test_availability_reports_every_backend() {
        let dir = tempfile::tempdir().unwrap();
        install_stub(dir.path(), "gemini");
        let registry = AgentRegistry::builtin().with_search_path(dir.path());

        let report = registry.availability();
        assert_eq!(report.len(), 3);
        let gemini = report.iter().find(|a| a.name == "gemini").unwrap();
        assert!(gemini.is_available());
        let codex = report.iter().find(|a| a.name == "codex").unwrap();
        assert!(!codex.is_available());
    }
}
