//! Attachment receiver: places uploaded files on disk for the send pipeline.

use std::io;
use std::path::{Path, PathBuf};

use axum::extract::multipart::{MultipartError, MultipartRejection};
use chrono::Utc;
use mailgate_core::dispatch::AttachmentFile;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};
use uuid::Uuid;

/// Multipart field carrying the attachment.
pub const ATTACHMENT_FIELD: &str = "attachment";

/// Upload failures.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Request was not a readable multipart body.
    #[error("{0}")]
    Rejected(#[from] MultipartRejection),

    /// A multipart field could not be read.
    #[error("{0}")]
    Multipart(#[from] MultipartError),

    /// The attachment could not be written.
    #[error("failed to store attachment: {0}")]
    Io(#[from] io::Error),
}

/// Writes uploads into a dedicated directory under unique names.
#[derive(Debug, Clone)]
pub struct AttachmentReceiver {
    dir: PathBuf,
}

impl AttachmentReceiver {
    /// Creates a receiver for `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory uploads are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the attachments directory if needed.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Stores `bytes` and returns the attachment reference handed to the pipeline.
    ///
    /// The file is created exclusively; an existing path is never overwritten.
    /// A failed write removes the partial file before the error is returned.
    pub async fn store(
        &self,
        original_name: &str,
        content_type: Option<String>,
        bytes: &[u8],
    ) -> io::Result<AttachmentFile> {
        let filename = sanitize_filename(original_name);
        let path = self.dir.join(unique_name(&filename));

        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        write_or_discard(&path, file, bytes).await?;

        debug!(path = %path.display(), size = bytes.len(), "Attachment stored");

        Ok(AttachmentFile {
            path,
            filename,
            content_type,
        })
    }
}

/// Writes `bytes` through `writer`, deleting `path` if the write or flush fails.
async fn write_or_discard<W>(path: &Path, mut writer: W, bytes: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut written = writer.write_all(bytes).await;
    if written.is_ok() {
        written = writer.flush().await;
    }
    drop(writer);

    if let Err(err) = written {
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!(
                path = %path.display(),
                error = %remove_err,
                "Failed to remove partial attachment"
            );
        }
        return Err(err);
    }
    Ok(())
}

/// `attachment_<unix millis>_<8 hex>_<name>`
fn unique_name(filename: &str) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!(
        "{ATTACHMENT_FIELD}_{}_{}_{filename}",
        Utc::now().timestamp_millis(),
        &nonce[..8]
    )
}

/// Strips directory components and control characters from a client file name.
fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Accepts a few bytes, then reports a full disk.
    struct FullDisk {
        capacity: usize,
    }

    impl AsyncWrite for FullDisk {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if self.capacity == 0 {
                return Poll::Ready(Err(io::Error::other("No space left on device")));
            }
            let n = buf.len().min(self.capacity);
            self.capacity -= n;
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[rstest]
    #[case("report.pdf", "report.pdf")]
    #[case("../../etc/passwd", "passwd")]
    #[case("C:\\Users\\me\\cv.docx", "cv.docx")]
    #[case("  notes.txt ", "notes.txt")]
    #[case("bad\nname.txt", "badname.txt")]
    #[case("", "upload")]
    #[case("dir/", "upload")]
    #[case("..", "upload")]
    fn test_sanitize_filename(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_filename(input), expected);
    }

    #[test]
    fn test_unique_names_differ() {
        let a = unique_name("report.pdf");
        let b = unique_name("report.pdf");

        assert_ne!(a, b);
        assert!(a.starts_with("attachment_"));
        assert!(a.ends_with("_report.pdf"));
    }

    #[tokio::test]
    async fn test_store_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let receiver = AttachmentReceiver::new(dir.path().join("attachments"));
        receiver.ensure_dir().await.unwrap();

        let stored = receiver
            .store("../report.pdf", Some("application/pdf".to_string()), b"%PDF")
            .await
            .unwrap();

        assert_eq!(stored.filename, "report.pdf");
        assert_eq!(stored.content_type.as_deref(), Some("application/pdf"));
        assert!(stored.path.starts_with(receiver.dir()));
        assert_eq!(std::fs::read(&stored.path).unwrap(), b"%PDF");
    }

    #[tokio::test]
    async fn test_store_same_name_twice_creates_two_files() {
        let dir = tempfile::tempdir().unwrap();
        let receiver = AttachmentReceiver::new(dir.path());

        let first = receiver.store("a.txt", None, b"1").await.unwrap();
        let second = receiver.store("a.txt", None, b"2").await.unwrap();

        assert_ne!(first.path, second.path);
        assert!(first.path.exists());
        assert!(second.path.exists());
    }

    #[tokio::test]
    async fn test_failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(unique_name("big.bin"));
        std::fs::write(&path, [7u8; 8]).unwrap();

        let result = write_or_discard(&path, FullDisk { capacity: 8 }, &[7u8; 64]).await;

        assert!(result.is_err());
        assert!(!path.exists());
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_successful_write_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kept.bin");
        let file = tokio::fs::File::create(&path).await.unwrap();

        write_or_discard(&path, file, b"data").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"data");
    }
}
