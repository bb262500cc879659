//! Traits implemented by the infrastructure adapters.
//!
//! The mail crate provides the OAuth2 and SMTP implementations; tests
//! provide in-memory doubles.

use async_trait::async_trait;
use mailgate_shared::{AccessToken, ConfigurationError, OAuthCredentials};

use super::error::{CredentialError, MailSessionError};
use super::types::OutboundMessage;

/// Exchanges a refresh token for a fresh access token.
///
/// Implementations must not cache: every call performs a new exchange.
#[async_trait]
pub trait CredentialBroker: Send + Sync {
    /// Obtains a new access token.
    async fn acquire_access_token(
        &self,
        credentials: &OAuthCredentials,
    ) -> Result<AccessToken, CredentialError>;
}

/// Builds one-shot authenticated mail sessions.
///
/// Construction performs no network I/O.
pub trait TransportFactory: Send + Sync {
    /// Creates a session bound to `access_token`.
    fn create_session(
        &self,
        sender: &str,
        credentials: &OAuthCredentials,
        access_token: AccessToken,
    ) -> Result<Box<dyn MailSession>, ConfigurationError>;
}

/// An authenticated session good for exactly one submission.
#[async_trait]
pub trait MailSession: Send {
    /// Submits the message, returning the relay's response text.
    async fn send(self: Box<Self>, message: &OutboundMessage) -> Result<String, MailSessionError>;
}
