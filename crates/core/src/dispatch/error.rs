//! Send pipeline error types.

use std::path::PathBuf;
use std::time::Duration;

use mailgate_shared::ConfigurationError;
use thiserror::Error;

/// Refresh-token exchange failures.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The provider rejected the exchange (revoked or expired refresh token, bad client).
    #[error("token endpoint rejected the refresh token ({status}): {detail}")]
    Rejected {
        /// HTTP status returned by the token endpoint.
        status: u16,
        /// Provider error detail.
        detail: String,
    },

    /// The token endpoint could not be reached.
    #[error("token endpoint unreachable: {0}")]
    Network(String),

    /// The token endpoint answered with something unusable.
    #[error("malformed token response: {0}")]
    MalformedResponse(String),

    /// The exchange did not finish in time.
    #[error("token exchange timed out after {0:?}")]
    Timeout(Duration),
}

/// Failures raised by a mail session while submitting a message.
#[derive(Debug, Error)]
pub enum MailSessionError {
    /// The message could not be built (bad address, unreadable attachment).
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// The relay rejected the message or the submission failed.
    #[error("submission failed: {0}")]
    Submission(String),
}

/// Why a message was not delivered.
#[derive(Debug, Error)]
pub enum SendFailure {
    /// Caller supplied a missing or malformed field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No access token could be obtained.
    #[error("credential acquisition failed: {0}")]
    CredentialAcquisition(#[from] CredentialError),

    /// The transport could not be built.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The relay rejected the message or could not be reached.
    #[error("send failed: {0}")]
    Send(String),

    /// Submission did not finish in time.
    #[error("send timed out after {0:?}")]
    SendTimeout(Duration),
}

impl From<MailSessionError> for SendFailure {
    fn from(err: MailSessionError) -> Self {
        match err {
            MailSessionError::InvalidMessage(msg) => Self::InvalidInput(msg),
            MailSessionError::Submission(msg) => Self::Send(msg),
        }
    }
}

/// Attachment deletion failure.
#[derive(Debug, Error)]
#[error("failed to remove attachment {}: {source}", path.display())]
pub struct CleanupError {
    /// Path that could not be removed.
    pub path: PathBuf,
    /// Underlying I/O error.
    #[source]
    pub source: std::io::Error,
}
