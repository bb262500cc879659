//! Credential-acquisition-and-send pipeline.
//!
//! ```text
//! OutboundMessage
//!   -> validate recipient
//!   -> CredentialBroker::acquire_access_token   (refresh-token exchange)
//!   -> TransportFactory::create_session          (no I/O)
//!   -> MailSession::send                         (one submission)
//!   -> AttachmentGuard::release                  (always)
//!   -> SendOutcome
//! ```

mod cleanup;
mod error;
mod pipeline;
mod ports;
mod types;

pub use cleanup::AttachmentGuard;
pub use error::{CleanupError, CredentialError, MailSessionError, SendFailure};
pub use pipeline::{PipelineTimeouts, SendPipeline};
pub use ports::{CredentialBroker, MailSession, TransportFactory};
pub use types::{AttachmentFile, OutboundMessage, SendOutcome};
