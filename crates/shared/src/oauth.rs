//! OAuth2 credential types shared by the broker and the mail transport.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Long-lived OAuth2 client credentials.
///
/// Loaded once at startup and shared read-only by every request.
#[derive(Clone)]
pub struct OAuthCredentials {
    client_id: String,
    client_secret: SecretString,
    refresh_token: SecretString,
}

impl OAuthCredentials {
    /// Creates a credential set.
    #[must_use]
    pub fn new(
        client_id: impl Into<String>,
        client_secret: SecretString,
        refresh_token: SecretString,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret,
            refresh_token,
        }
    }

    /// Creates a credential set from plain strings.
    #[must_use]
    pub fn from_parts(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self::new(
            client_id,
            SecretString::new(client_secret.into()),
            SecretString::new(refresh_token.into()),
        )
    }

    /// OAuth client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// OAuth client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        self.client_secret.expose_secret()
    }

    /// Refresh token exchanged for access tokens.
    #[must_use]
    pub fn refresh_token(&self) -> &str {
        self.refresh_token.expose_secret()
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Short-lived access token obtained from a refresh-token exchange.
///
/// Owned by a single send attempt and dropped with its transport session.
pub struct AccessToken {
    value: SecretString,
    expires_in: Option<Duration>,
}

impl AccessToken {
    /// Creates an access token.
    #[must_use]
    pub fn new(value: impl Into<String>, expires_in: Option<Duration>) -> Self {
        Self {
            value: SecretString::new(value.into()),
            expires_in,
        }
    }

    /// Raw token value.
    #[must_use]
    pub fn secret(&self) -> &str {
        self.value.expose_secret()
    }

    /// Lifetime reported by the provider, if any.
    #[must_use]
    pub const fn expires_in(&self) -> Option<Duration> {
        self.expires_in
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &mask(self.secret()))
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Masks a token for log output, keeping the first four characters.
fn mask(token: &str) -> String {
    match token.get(..4) {
        Some(prefix) if token.len() > 4 => format!("{prefix}***"),
        _ => "***".to_string(),
    }
}
