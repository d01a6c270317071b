// ABOUTME: Scoped temporary files for attachments handed to backends by path
// ABOUTME: Files are removed on release or drop, whichever comes first

use crate::error::{AgentError, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;

const FILE_PREFIX: &str = "prompt-anywhere-";

/// Writes attachment bytes to uniquely named files in the temp directory.
#[derive(Debug, Clone, Default)]
pub struct AttachmentStaging {
    dir: Option<PathBuf>,
}

impl AttachmentStaging {
    /// Stage into the OS temporary directory.
    pub fn new() -> Self {
        Self { dir: None }
    }

    /// Stage into `dir` instead of the OS temporary directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    pub fn stage(&self, bytes: &[u8]) -> Result<StagedAttachment> {
        let suffix = format!(".{}", sniff_extension(bytes));
        let mut builder = tempfile::Builder::new();
        builder.prefix(FILE_PREFIX).suffix(&suffix);

        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| AgentError::Staging(e.to_string()))?;

        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| AgentError::Staging(e.to_string()))?;

        // Close the handle but keep the path; the file must stay readable by
        // the child on platforms that lock open files.
        let path = file.into_temp_path();
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Staged attachment");
        Ok(StagedAttachment { path })
    }
}

/// An attachment on disk, owned by exactly one session.
///
/// Dropping it removes the file too; [`StagedAttachment::release`] does the
/// same but logs failures.
#[derive(Debug)]
pub struct StagedAttachment {
    path: TempPath,
}

impl StagedAttachment {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the file. A file that is already gone is not an error.
    pub fn release(self) {
        let shown = self.path.display().to_string();
        match self.path.close() {
            Ok(()) => tracing::debug!(path = %shown, "Released attachment"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %shown, error = %e, "Failed to remove attachment"),
        }
    }
}

/// File extension for common image formats, from magic bytes.
pub fn sniff_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        "png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "gif"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else {
        "bin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let staging = AttachmentStaging::in_dir(dir.path());
        let staged = staging.stage(b"\x89PNG\r\n\x1a\npixels").unwrap();

        assert!(staged.path().starts_with(dir.path()));
        assert_eq!(staged.path().extension().unwrap(), "png");
        assert_eq!(
            std::fs::read(staged.path()).unwrap(),
            b"\x89PNG\r\n\x1a\npixels"
        );
    }

    #[test]
    fn test_release_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = AttachmentStaging::in_dir(dir.path()).stage(b"data").unwrap();
        let path = staged.path().to_path_buf();
        assert!(path.exists());

        staged.release();
        assert!(!path.exists());
    }

    #[test]
    fn test_release_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let staged = AttachmentStaging::in_dir(dir.path()).stage(b"data").unwrap();
        std::fs::remove_file(staged.path()).unwrap();

        // Already gone: must not panic or error.
        staged.release();
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = {
            let staged = AttachmentStaging::in_dir(dir.path()).stage(b"data").unwrap();
            staged.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let staging = AttachmentStaging::in_dir(dir.path());
        let a = staging.stage(b"a").unwrap();
        let b = staging.stage(b"b").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_stage_into_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let staging = AttachmentStaging::in_dir(dir.path().join("missing"));
        let err = staging.stage(b"data").unwrap_err();
        assert!(matches!(err, AgentError::Staging(_)));
    }

    #[test]
    fn test_sniff_extension() {
        assert_eq!(sniff_extension(b"\x89PNG\r\n\x1a\n...."), "png");
        assert_eq!(sniff_extension(&[0xFF, 0xD8, 0xFF, 0xE0]), "jpg");
        assert_eq!(sniff_extension(b"GIF89a..."), "gif");
        assert_eq!(sniff_extension(b"RIFF\0\0\0\0WEBPVP8 "), "webp");
        assert_eq!(sniff_extension(b"plain text"), "bin");
        assert_eq!(sniff_extension(b""), "bin");
    }
}
