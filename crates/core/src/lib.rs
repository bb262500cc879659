//! Core send pipeline for Mailgate.
//!
//! This crate contains the orchestration logic with ZERO web or SMTP dependencies.
//! Network collaborators are reached through the traits in [`dispatch`].
//!
//! # Modules
//!
//! - `dispatch` - Credential acquisition, session creation, submission and attachment cleanup

pub mod dispatch;
