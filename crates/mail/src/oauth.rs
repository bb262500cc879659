//! OAuth2 refresh-token exchange against a token endpoint.

use std::time::Duration;

use async_trait::async_trait;
use mailgate_core::dispatch::{CredentialBroker, CredentialError};
use mailgate_shared::{AccessToken, ConfigurationError, OAuthCredentials};
use serde::Deserialize;
use tracing::{debug, warn};

/// Successful token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Error body defined by RFC 6749 section 5.2.
#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

impl TokenErrorResponse {
    fn detail(self) -> String {
        self.error_description
            .or(self.error)
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// Credential broker performing a `refresh_token` grant on every call.
#[derive(Debug, Clone)]
pub struct OAuthTokenBroker {
    client: reqwest::Client,
    token_url: String,
}

impl OAuthTokenBroker {
    /// Creates a broker for `token_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        token_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConfigurationError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigurationError::Invalid {
                key: "oauth.token_url",
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            token_url: token_url.into(),
        })
    }
}

#[async_trait]
impl CredentialBroker for OAuthTokenBroker {
    async fn acquire_access_token(
        &self,
        credentials: &OAuthCredentials,
    ) -> Result<AccessToken, CredentialError> {
        debug!(token_url = %self.token_url, "Refreshing access token");

        let resp = self
            .client
            .post(&self.token_url)
            .form(&[
                ("client_id", credentials.client_id()),
                ("client_secret", credentials.client_secret()),
                ("refresh_token", credentials.refresh_token()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| CredentialError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<TokenErrorResponse>(&body)
                .unwrap_or_default()
                .detail();
            warn!(status = status.as_u16(), detail = %detail, "Token refresh rejected");
            return Err(CredentialError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| CredentialError::MalformedResponse(e.to_string()))?;

        if token.access_token.is_empty() {
            return Err(CredentialError::MalformedResponse(
                "empty access_token in refresh response".to_string(),
            ));
        }

        debug!(expires_in = ?token.expires_in, "Access token refreshed");
        Ok(AccessToken::new(
            token.access_token,
            token.expires_in.map(Duration::from_secs),
        ))
    }
}
