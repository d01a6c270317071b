// ABOUTME: Shared logging setup for prompt-anywhere callers
// ABOUTME: init() logs to stderr beside streamed answers, init_file() logs to a per-app file

use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Directory name used under the platform config dir.
const APP_DIR: &str = "prompt-anywhere";

/// Crates whose events are shown at the caller's default level.
const WORKSPACE_CRATES: &[&str] = &["anywhere_core", "anywhere_cli", "anywhere"];

/// Logging to stderr, leaving stdout to the streamed answer.
/// INFO for prompt-anywhere crates, WARN for dependencies; RUST_LOG replaces both.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(filter(Level::INFO))
        .with_writer(std::io::stderr)
        .init();
}

/// Logging to `<config_dir>/prompt-anywhere/{app_name}/{app_name}.log`, for
/// callers without a terminal (the desktop shell, `anywhere --log-file`).
/// Same levels as [`init`] but WARN for our crates too.
///
/// Returns the log path. If setup fails, prints a warning to stderr and
/// continues without logging.
pub fn init_file(app_name: &str) -> Option<PathBuf> {
    let opened = dirs::config_dir()
        .ok_or_else(|| std::io::Error::other("could not determine config directory"))
        .and_then(|config_dir| open_log_file(&config_dir, app_name));

    match opened {
        Ok((log_file, path)) => {
            tracing_subscriber::fmt()
                .with_writer(log_file)
                .with_env_filter(filter(Level::WARN))
                .with_ansi(false)
                .init();
            Some(path)
        }
        Err(e) => {
            eprintln!("Warning: failed to set up file logging: {e}");
            None
        }
    }
}

/// Location of the log file for `app_name` under `config_dir`.
pub fn log_file_path(config_dir: &Path, app_name: &str) -> PathBuf {
    config_dir
        .join(APP_DIR)
        .join(app_name)
        .join(format!("{app_name}.log"))
}

fn open_log_file(config_dir: &Path, app_name: &str) -> std::io::Result<(File, PathBuf)> {
    let path = log_file_path(config_dir, app_name);
    if let Some(log_dir) = path.parent() {
        std::fs::create_dir_all(log_dir)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)?;
    Ok((file, path))
}

/// RUST_LOG when set, otherwise WARN with `ours` for the workspace crates.
fn filter(ours: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(ours))
}

fn default_filter(ours: Level) -> EnvFilter {
    workspace_directives(ours)
        .iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(EnvFilter::new("warn"), EnvFilter::add_directive)
}

fn workspace_directives(level: Level) -> Vec<String> {
    let level = level.as_str().to_ascii_lowercase();
    WORKSPACE_CRATES
        .iter()
        .map(|name| format!("{name}={level}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_init() {
        let _ = super::init as fn();
    }

    #[test]
    fn exports_init_file() {
        let _ = super::init_file as fn(&str) -> Option<PathBuf>;
    }

    #[test]
    fn log_file_lives_under_app_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = log_file_path(dir.path(), "shell");
        assert_eq!(
            path,
            dir.path()
                .join("prompt-anywhere")
                .join("shell")
                .join("shell.log")
        );
    }

    #[test]
    fn open_log_file_creates_dirs_and_appends() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let (mut first, path) = open_log_file(dir.path(), "anywhere").unwrap();
        writeln!(first, "one").unwrap();
        drop(first);

        let (mut second, again) = open_log_file(dir.path(), "anywhere").unwrap();
        writeln!(second, "two").unwrap();
        drop(second);

        assert_eq!(path, again);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "one\ntwo\n");
    }

    #[test]
    fn open_log_file_fails_when_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("prompt-anywhere"), "").unwrap();
        assert!(open_log_file(dir.path(), "anywhere").is_err());
    }

    #[test]
    fn workspace_crates_get_requested_level() {
        assert_eq!(
            workspace_directives(Level::INFO),
            vec!["anywhere_core=info", "anywhere_cli=info", "anywhere=info"]
        );
        for directive in workspace_directives(Level::WARN) {
            assert!(directive.parse::<tracing_subscriber::filter::Directive>().is_ok());
        }
    }

    #[test]
    fn default_filter_names_workspace_crates() {
        let rendered = default_filter(Level::INFO).to_string();
        assert!(rendered.contains("anywhere_core=info"));
        assert!(rendered.contains("warn"));
    }
}
