//! Shared types, errors, and configuration for Mailgate.
//!
//! This crate provides common types used across all other crates:
//! - OAuth2 credential set and access token
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod oauth;

pub use config::{AppConfig, ConfigurationError};
pub use error::AppError;
pub use oauth::{AccessToken, OAuthCredentials};
