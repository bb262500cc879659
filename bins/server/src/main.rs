//! Mailgate Server
//!
//! Main entry point for the form-to-email service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailgate_api::{AppState, create_router, uploads::AttachmentReceiver};
use mailgate_core::dispatch::{PipelineTimeouts, SendPipeline};
use mailgate_mail::{OAuthTokenBroker, SmtpTransportFactory};
use mailgate_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailgate=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing credentials stop the process before the port is bound
    let config = AppConfig::load().context("Failed to load configuration")?;

    let broker = OAuthTokenBroker::new(config.oauth.token_url.clone(), config.oauth.timeout())?;
    let transports = SmtpTransportFactory::new(
        config.mail.smtp_host.clone(),
        config.mail.smtp_port,
        config.mail.timeout(),
    );
    info!(
        smtp_host = %config.mail.smtp_host,
        smtp_port = %config.mail.smtp_port,
        sender = %config.mail.sender,
        "Mail transport configured"
    );

    let pipeline = SendPipeline::new(
        Arc::new(config.oauth.credentials()),
        Arc::new(broker),
        Arc::new(transports),
    )
    .with_timeouts(PipelineTimeouts {
        token_exchange: config.oauth.timeout(),
        submission: config.mail.timeout(),
    });

    let attachments = AttachmentReceiver::new(config.uploads.attachments_dir.clone());
    attachments
        .ensure_dir()
        .await
        .with_context(|| format!("Failed to create {}", attachments.dir().display()))?;
    info!(dir = %attachments.dir().display(), "Attachments directory ready");

    // Create application state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        attachments: Arc::new(attachments),
        sender: Arc::from(config.mail.sender.as_str()),
    };

    // Create router
    let app = create_router(state, &config.uploads);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
