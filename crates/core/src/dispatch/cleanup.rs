//! Scoped ownership of an uploaded attachment file.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::error::CleanupError;

/// Owns an attachment path until it is released.
///
/// `release` deletes the file exactly once and reports the result. If the
/// guard is dropped without being released (the pipeline future was
/// cancelled), the file is removed synchronously on a best-effort basis.
#[derive(Debug)]
pub struct AttachmentGuard {
    path: Option<PathBuf>,
}

impl AttachmentGuard {
    /// Takes ownership of `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Path being guarded, until released.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Deletes the file.
    ///
    /// # Errors
    ///
    /// Returns a `CleanupError` if the file could not be removed, including
    /// when it no longer exists.
    pub async fn release(mut self) -> Result<(), CleanupError> {
        let Some(path) = self.path.take() else {
            return Ok(());
        };

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Attachment removed");
                Ok(())
            }
            Err(source) => Err(CleanupError { path, source }),
        }
    }
}

impl Drop for AttachmentGuard {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "Failed to remove abandoned attachment");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_release_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attachment_1_report.pdf");
        std::fs::write(&path, b"pdf").unwrap();

        let guard = AttachmentGuard::new(&path);
        assert_eq!(guard.path(), Some(path.as_path()));

        guard.release().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_release_missing_file_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("already_gone.txt");

        let err = AttachmentGuard::new(&path).release().await.unwrap_err();
        assert_eq!(err.path, path);
        assert_eq!(err.source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_drop_without_release_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abandoned.txt");
        std::fs::write(&path, b"x").unwrap();

        drop(AttachmentGuard::new(&path));
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_of_missing_file_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        drop(AttachmentGuard::new(dir.path().join("never_existed")));
    }
}
