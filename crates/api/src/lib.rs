//! HTTP layer for Mailgate.
//!
//! This crate provides:
//! - `POST /send_email` form handling
//! - `GET /health`
//! - Static front end (`index.html`, `success.html`) for every other path
//! - The attachment receiver that places uploads on disk

pub mod error;
pub mod routes;
pub mod uploads;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use mailgate_core::dispatch::SendPipeline;
use mailgate_shared::config::UploadConfig;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::uploads::AttachmentReceiver;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Send pipeline shared by every request.
    pub pipeline: Arc<SendPipeline>,
    /// Where uploads are placed before sending.
    pub attachments: Arc<AttachmentReceiver>,
    /// Configured sender address.
    pub sender: Arc<str>,
}

/// Creates the main application router.
pub fn create_router(state: AppState, uploads: &UploadConfig) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .fallback_service(ServeDir::new(&uploads.public_dir))
        .layer(DefaultBodyLimit::max(uploads.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
