//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod health;
pub mod mail;

/// Creates the router with all dynamic routes.
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(health::routes()).merge(mail::routes())
}
