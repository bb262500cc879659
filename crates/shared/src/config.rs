//! Application configuration management.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::oauth::OAuthCredentials;

/// Environment variables read on top of the layered sources.
///
/// These take precedence over `MAILGATE__*` variables and config files.
const WELL_KNOWN_ENV: [(&str, &str); 4] = [
    ("OAUTH_CLIENT_ID", "oauth.client_id"),
    ("OAUTH_CLIENT_SECRET", "oauth.client_secret"),
    ("OAUTH_REFRESH_TOKEN", "oauth.refresh_token"),
    ("SENDER_EMAIL", "mail.sender"),
];

/// Configuration errors.
///
/// Raised at startup; the process must not accept requests after one.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Configuration sources could not be read or deserialized.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// A required value is missing or blank.
    #[error("missing required configuration value: {0}")]
    Missing(&'static str),

    /// A value is present but unusable.
    #[error("invalid configuration value for {key}: {reason}")]
    Invalid {
        /// Configuration key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// OAuth2 client configuration.
    #[serde(default)]
    pub oauth: OAuthConfig,
    /// Outbound mail configuration.
    #[serde(default)]
    pub mail: MailConfig,
    /// Upload and static file configuration.
    #[serde(default)]
    pub uploads: UploadConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// OAuth2 client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    /// OAuth client ID.
    #[serde(default)]
    pub client_id: String,
    /// OAuth client secret.
    #[serde(default = "empty_secret")]
    pub client_secret: SecretString,
    /// Long-lived refresh token.
    #[serde(default = "empty_secret")]
    pub refresh_token: SecretString,
    /// Token endpoint used for the refresh-token grant.
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Upper bound for one token exchange, in seconds.
    #[serde(default = "default_oauth_timeout")]
    pub timeout_secs: u64,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: empty_secret(),
            refresh_token: empty_secret(),
            token_url: default_token_url(),
            timeout_secs: default_oauth_timeout(),
        }
    }
}

fn empty_secret() -> SecretString {
    SecretString::new(String::new())
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_oauth_timeout() -> u64 {
    10
}

impl OAuthConfig {
    /// Returns the credential set used by every send.
    #[must_use]
    pub fn credentials(&self) -> OAuthCredentials {
        OAuthCredentials::new(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.refresh_token.clone(),
        )
    }

    /// Token exchange timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Outbound mail configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    /// Sender address, also the XOAUTH2 user.
    #[serde(default)]
    pub sender: String,
    /// SMTP relay host.
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    /// SMTP relay port. 587 uses STARTTLS, any other port implicit TLS.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// Upper bound for one submission, in seconds.
    #[serde(default = "default_send_timeout")]
    pub timeout_secs: u64,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            sender: String::new(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            timeout_secs: default_send_timeout(),
        }
    }
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    465
}

fn default_send_timeout() -> u64 {
    30
}

impl MailConfig {
    /// Submission timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Upload and static file configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    /// Directory where uploaded attachments are placed until sent.
    #[serde(default = "default_attachments_dir")]
    pub attachments_dir: PathBuf,
    /// Directory served as the static front end.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
    /// Maximum accepted request body size.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            attachments_dir: default_attachments_dir(),
            public_dir: default_public_dir(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_attachments_dir() -> PathBuf {
    PathBuf::from("./attachments")
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("./public")
}

fn default_max_upload_bytes() -> usize {
    25 * 1024 * 1024 // Gmail message size limit
}

impl AppConfig {
    /// Loads configuration from config files and environment, then validates it.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or a required
    /// value is missing.
    pub fn load() -> Result<Self, ConfigurationError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MAILGATE").separator("__"));

        for (var, key) in WELL_KNOWN_ENV {
            builder = builder.set_override_option(key, std::env::var(var).ok())?;
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value needed to send mail is present.
    ///
    /// # Errors
    ///
    /// Returns the first missing or invalid value.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.oauth.client_id.trim().is_empty() {
            return Err(ConfigurationError::Missing("oauth.client_id"));
        }
        if self.oauth.client_secret.expose_secret().trim().is_empty() {
            return Err(ConfigurationError::Missing("oauth.client_secret"));
        }
        if self.oauth.refresh_token.expose_secret().trim().is_empty() {
            return Err(ConfigurationError::Missing("oauth.refresh_token"));
        }
        if self.mail.sender.trim().is_empty() {
            return Err(ConfigurationError::Missing("mail.sender"));
        }
        if !self.mail.sender.contains('@') {
            return Err(ConfigurationError::Invalid {
                key: "mail.sender",
                reason: format!("'{}' is not an email address", self.mail.sender),
            });
        }
        if self.oauth.timeout_secs == 0 || self.mail.timeout_secs == 0 {
            return Err(ConfigurationError::Invalid {
                key: "timeout_secs",
                reason: "timeouts must be at least one second".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
