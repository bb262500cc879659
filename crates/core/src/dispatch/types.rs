//! Message and outcome types for the send pipeline.

use std::path::PathBuf;

use super::error::{CleanupError, SendFailure};

/// A file uploaded with the form, owned by one send attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
    /// Location of the stored upload.
    pub path: PathBuf,
    /// Original file name supplied by the caller.
    pub filename: String,
    /// MIME type supplied by the caller.
    pub content_type: Option<String>,
}

impl AttachmentFile {
    /// Creates an attachment reference.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            filename: filename.into(),
            content_type: None,
        }
    }

    /// Sets the MIME type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// An email to be sent on behalf of the configured sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Sender address (fixed by configuration).
    pub sender: String,
    /// Recipient address.
    pub recipient: String,
    /// Subject line.
    pub subject: String,
    /// Plain text body.
    pub body_text: String,
    /// Optional attachment.
    pub attachment: Option<AttachmentFile>,
}

impl OutboundMessage {
    /// Creates a message without an attachment.
    #[must_use]
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        subject: impl Into<String>,
        body_text: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            subject: subject.into(),
            body_text: body_text.into(),
            attachment: None,
        }
    }

    /// Attaches a stored upload.
    #[must_use]
    pub fn with_attachment(mut self, attachment: AttachmentFile) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Result of one pass through the send pipeline.
///
/// Cleanup problems ride along as a secondary warning and never change
/// whether the message was delivered.
#[derive(Debug)]
pub enum SendOutcome {
    /// The relay accepted the message.
    Delivered {
        /// Human-readable provider response, e.g. `250 OK`.
        response: String,
        /// Attachment deletion failure, if any.
        cleanup: Option<CleanupError>,
    },
    /// The message was not sent.
    Failed {
        /// Why sending failed.
        reason: SendFailure,
        /// Attachment deletion failure, if any.
        cleanup: Option<CleanupError>,
    },
}

impl SendOutcome {
    /// Returns true if the relay accepted the message.
    #[must_use]
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }

    /// Provider response for a delivered message.
    #[must_use]
    pub fn response(&self) -> Option<&str> {
        match self {
            Self::Delivered { response, .. } => Some(response),
            Self::Failed { .. } => None,
        }
    }

    /// Failure reason for an undelivered message.
    #[must_use]
    pub const fn failure(&self) -> Option<&SendFailure> {
        match self {
            Self::Failed { reason, .. } => Some(reason),
            Self::Delivered { .. } => None,
        }
    }

    /// Attachment cleanup warning, if deletion failed.
    #[must_use]
    pub const fn cleanup_warning(&self) -> Option<&CleanupError> {
        match self {
            Self::Delivered { cleanup, .. } | Self::Failed { cleanup, .. } => cleanup.as_ref(),
        }
    }

    pub(crate) fn from_result(
        result: Result<String, SendFailure>,
        cleanup: Option<CleanupError>,
    ) -> Self {
        match result {
            Ok(response) => Self::Delivered { response, cleanup },
            Err(reason) => Self::Failed { reason, cleanup },
        }
    }
}
