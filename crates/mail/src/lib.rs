//! Infrastructure adapters for the Mailgate send pipeline.
//!
//! This crate provides:
//! - `OAuthTokenBroker` - refresh-token exchange over HTTPS
//! - `SmtpTransportFactory` - XOAUTH2-authenticated SMTP sessions

pub mod oauth;
pub mod smtp;

pub use oauth::OAuthTokenBroker;
pub use smtp::{SmtpSession, SmtpTransportFactory};
