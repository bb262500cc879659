//! SMTP transport authenticated with XOAUTH2.
//!
//! Uses `lettre` for message building and the async SMTP transport.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::response::Response;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use mailgate_core::dispatch::{
    AttachmentFile, MailSession, MailSessionError, OutboundMessage, TransportFactory,
};
use mailgate_shared::{AccessToken, ConfigurationError, OAuthCredentials};
use tracing::debug;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Message submission port (RFC 6409), upgraded with STARTTLS.
const SUBMISSION_PORT: u16 = 587;

/// How the connection to the relay is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TlsMode {
    Implicit,
    StartTls,
}

impl TlsMode {
    const fn for_port(port: u16) -> Self {
        if port == SUBMISSION_PORT {
            Self::StartTls
        } else {
            Self::Implicit
        }
    }
}

/// Builds XOAUTH2 SMTP sessions against one relay.
#[derive(Debug, Clone)]
pub struct SmtpTransportFactory {
    host: String,
    port: u16,
    timeout: Duration,
}

impl SmtpTransportFactory {
    /// Creates a factory for `host:port`.
    ///
    /// Port 587 negotiates STARTTLS; every other port uses implicit TLS.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            timeout,
        }
    }
}

impl TransportFactory for SmtpTransportFactory {
    /// Binds the access token to a new transport.
    ///
    /// XOAUTH2 only needs the sender and the access token; the client
    /// credentials stay with the broker.
    fn create_session(
        &self,
        sender: &str,
        _credentials: &OAuthCredentials,
        access_token: AccessToken,
    ) -> Result<Box<dyn MailSession>, ConfigurationError> {
        let creds = Credentials::new(sender.to_string(), access_token.secret().to_string());

        let builder = match TlsMode::for_port(self.port) {
            TlsMode::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&self.host),
            TlsMode::StartTls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.host),
        };
        let transport = builder
            .map_err(|e| ConfigurationError::Invalid {
                key: "mail.smtp_host",
                reason: e.to_string(),
            })?
            .port(self.port)
            .credentials(creds)
            .authentication(vec![Mechanism::Xoauth2])
            .timeout(Some(self.timeout))
            .build();

        Ok(Box::new(SmtpSession { transport }))
    }
}

/// One-shot SMTP session.
pub struct SmtpSession {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

#[async_trait]
impl MailSession for SmtpSession {
    async fn send(self: Box<Self>, message: &OutboundMessage) -> Result<String, MailSessionError> {
        let attachment = match &message.attachment {
            Some(file) => Some(read_attachment(file).await?),
            None => None,
        };
        let email = build_message(message, attachment)?;

        let response = self
            .transport
            .send(email)
            .await
            .map_err(|e| MailSessionError::Submission(e.to_string()))?;

        Ok(describe_response(&response))
    }
}

/// Attachment file contents ready to be encoded.
struct LoadedAttachment {
    filename: String,
    content_type: ContentType,
    bytes: Vec<u8>,
}

async fn read_attachment(file: &AttachmentFile) -> Result<LoadedAttachment, MailSessionError> {
    let bytes = tokio::fs::read(&file.path).await.map_err(|e| {
        MailSessionError::InvalidMessage(format!(
            "cannot read attachment {}: {e}",
            file.path.display()
        ))
    })?;
    debug!(path = %file.path.display(), size = bytes.len(), "Attachment loaded");

    Ok(LoadedAttachment {
        filename: file.filename.clone(),
        content_type: content_type_for(file.content_type.as_deref())?,
        bytes,
    })
}

fn content_type_for(declared: Option<&str>) -> Result<ContentType, MailSessionError> {
    if let Some(parsed) = declared.and_then(|ct| ContentType::parse(ct).ok()) {
        return Ok(parsed);
    }
    ContentType::parse(FALLBACK_CONTENT_TYPE)
        .map_err(|e| MailSessionError::InvalidMessage(e.to_string()))
}

fn parse_mailbox(role: &str, address: &str) -> Result<Mailbox, MailSessionError> {
    address.trim().parse().map_err(|e| {
        MailSessionError::InvalidMessage(format!("invalid {role} address '{address}': {e}"))
    })
}

/// Builds the MIME message: plain text, or multipart/mixed with one attachment.
fn build_message(
    message: &OutboundMessage,
    attachment: Option<LoadedAttachment>,
) -> Result<Message, MailSessionError> {
    let builder = Message::builder()
        .from(parse_mailbox("sender", &message.sender)?)
        .to(parse_mailbox("recipient", &message.recipient)?)
        .subject(message.subject.clone());

    let built = match attachment {
        None => builder
            .header(ContentType::TEXT_PLAIN)
            .body(message.body_text.clone()),
        Some(file) => builder.multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(message.body_text.clone()))
                .singlepart(Attachment::new(file.filename).body(file.bytes, file.content_type)),
        ),
    };

    built.map_err(|e| MailSessionError::InvalidMessage(e.to_string()))
}

/// Renders a relay response as `<code> <text>`, e.g. `250 2.0.0 OK`.
fn describe_response(response: &Response) -> String {
    let text = response.message().collect::<Vec<_>>().join(" ");
    format!("{} {}", response.code(), text).trim_end().to_string()
}

#[cfg(test)]
#[path = "smtp_tests.rs"]
mod tests;
