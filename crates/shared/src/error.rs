//! Application-wide error types.

use thiserror::Error;

/// Caller-visible error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// Multipart body could not be read or the attachment could not be stored.
    #[error("Error uploading file: {0}")]
    Upload(String),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Access token could not be obtained.
    #[error("Credential acquisition failed: {0}")]
    Credential(String),

    /// The mail relay rejected the message or could not be reached.
    #[error("Delivery failed: {0}")]
    Delivery(String),

    /// An outbound call did not finish in time.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Server-side configuration is unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Upload(_) | Self::Validation(_) => 400,
            Self::Credential(_) | Self::Delivery(_) => 502,
            Self::Timeout(_) => 504,
            Self::Configuration(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Upload(_) => "UPLOAD_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Credential(_) => "CREDENTIAL_ERROR",
            Self::Delivery(_) => "DELIVERY_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}
