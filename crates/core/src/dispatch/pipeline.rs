//! Send pipeline orchestration.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mailgate_shared::OAuthCredentials;
use tracing::{info, warn};

use super::cleanup::AttachmentGuard;
use super::error::{CredentialError, SendFailure};
use super::ports::{CredentialBroker, TransportFactory};
use super::types::{OutboundMessage, SendOutcome};

/// Upper bounds for the two network calls of a send.
#[derive(Debug, Clone, Copy)]
pub struct PipelineTimeouts {
    /// Token exchange bound.
    pub token_exchange: Duration,
    /// Mail submission bound.
    pub submission: Duration,
}

impl Default for PipelineTimeouts {
    fn default() -> Self {
        Self {
            token_exchange: Duration::from_secs(10),
            submission: Duration::from_secs(30),
        }
    }
}

/// Converts an outbound message into one delivery attempt.
///
/// Every call acquires a new access token, builds a new session, submits
/// once, and removes the attachment (if any) before returning. Failures are
/// terminal; nothing is retried.
pub struct SendPipeline {
    credentials: Arc<OAuthCredentials>,
    broker: Arc<dyn CredentialBroker>,
    transports: Arc<dyn TransportFactory>,
    timeouts: PipelineTimeouts,
}

impl SendPipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(
        credentials: Arc<OAuthCredentials>,
        broker: Arc<dyn CredentialBroker>,
        transports: Arc<dyn TransportFactory>,
    ) -> Self {
        Self {
            credentials,
            broker,
            transports,
            timeouts: PipelineTimeouts::default(),
        }
    }

    /// Overrides the network timeouts.
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: PipelineTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Sends `message` and cleans up its attachment.
    pub async fn send(&self, message: OutboundMessage) -> SendOutcome {
        let guard = message
            .attachment
            .as_ref()
            .map(|attachment| AttachmentGuard::new(&attachment.path));

        let result = self.dispatch(&message).await;

        let cleanup = match guard {
            Some(guard) => guard.release().await.err(),
            None => None,
        };

        match &result {
            Ok(response) => {
                info!(recipient = %message.recipient, response = %response, "Email sent");
            }
            Err(reason) => {
                warn!(recipient = %message.recipient, error = %reason, "Email not sent");
            }
        }
        if let Some(err) = &cleanup {
            warn!(error = %err, "Attachment cleanup failed");
        }

        SendOutcome::from_result(result, cleanup)
    }

    async fn dispatch(&self, message: &OutboundMessage) -> Result<String, SendFailure> {
        if message.recipient.trim().is_empty() {
            return Err(SendFailure::InvalidInput(
                "recipient email address is required".to_string(),
            ));
        }

        let token_timeout = self.timeouts.token_exchange;
        let access_token = bounded(
            token_timeout,
            self.broker.acquire_access_token(&self.credentials),
        )
        .await
        .ok_or(CredentialError::Timeout(token_timeout))??;

        let session =
            self.transports
                .create_session(&message.sender, &self.credentials, access_token)?;

        let submit_timeout = self.timeouts.submission;
        let response = bounded(submit_timeout, session.send(message))
            .await
            .ok_or(SendFailure::SendTimeout(submit_timeout))??;

        Ok(response)
    }
}

/// Runs `fut` with a deadline; `None` means it elapsed.
async fn bounded<F: Future>(limit: Duration, fut: F) -> Option<F::Output> {
    tokio::time::timeout(limit, fut).await.ok()
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
