//! Contact form submission route.

use axum::{
    Router,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::HeaderValue,
    response::{IntoResponse, Redirect, Response},
    routing::post,
};
use mailgate_core::dispatch::{OutboundMessage, SendOutcome};
use mailgate_shared::AppError;
use tracing::{info, warn};

use crate::AppState;
use crate::error::{error_response, failure_to_app_error};
use crate::uploads::{ATTACHMENT_FIELD, AttachmentReceiver, UploadError};

/// Page the browser is sent to after delivery.
pub const SUCCESS_PAGE: &str = "/success.html";

/// Header set when the email went out but its attachment was not removed.
pub const CLEANUP_HEADER: &str = "x-attachment-cleanup";

/// Creates the mail routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/send_email", post(send_email))
}

/// Form fields of `POST /send_email`.
#[derive(Debug, Default)]
struct EmailForm {
    email: String,
    subject: String,
    message: String,
}

/// Attachment bytes held until every field has been read.
struct PendingUpload {
    filename: String,
    content_type: Option<String>,
    bytes: axum::body::Bytes,
}

/// POST /send_email - Send the submitted form as an email.
async fn send_email(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let message = match read_submission(multipart, &state.attachments, &state.sender).await {
        Ok(message) => message,
        Err(e) => {
            warn!(error = %e, "Failed to read submission");
            return error_response(&AppError::Upload(e.to_string()));
        }
    };

    info!(
        recipient = %message.recipient,
        has_attachment = message.attachment.is_some(),
        "Sending email"
    );

    let outcome = state.pipeline.send(message).await;
    outcome_response(&outcome)
}

/// Reads the multipart body and stores the attachment, if any.
///
/// The file is only written after the whole body was read, so a broken
/// request never leaves an upload behind.
async fn read_submission(
    multipart: Result<Multipart, MultipartRejection>,
    receiver: &AttachmentReceiver,
    sender: &str,
) -> Result<OutboundMessage, UploadError> {
    let mut multipart = multipart?;
    let mut form = EmailForm::default();
    let mut upload: Option<PendingUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(ToString::to_string);
        match name.as_deref() {
            Some("email") => form.email = field.text().await?,
            Some("subject") => form.subject = field.text().await?,
            Some("message") => form.message = field.text().await?,
            Some(ATTACHMENT_FIELD) => {
                let filename = field.file_name().map(ToString::to_string);
                let content_type = field.content_type().map(ToString::to_string);
                let bytes = field.bytes().await?;
                // Browsers send an empty file part when nothing was selected.
                if let Some(filename) = filename.filter(|f| !f.is_empty()) {
                    upload = Some(PendingUpload {
                        filename,
                        content_type,
                        bytes,
                    });
                }
            }
            _ => {}
        }
    }

    let mut message = OutboundMessage::new(sender, form.email, form.subject, form.message);
    if let Some(upload) = upload {
        let stored = receiver
            .store(&upload.filename, upload.content_type, &upload.bytes)
            .await?;
        message = message.with_attachment(stored);
    }

    Ok(message)
}

/// Maps a pipeline outcome to the caller-visible response.
fn outcome_response(outcome: &SendOutcome) -> Response {
    match outcome {
        SendOutcome::Delivered { cleanup, .. } => {
            let mut response = Redirect::to(SUCCESS_PAGE).into_response();
            if cleanup.is_some() {
                response
                    .headers_mut()
                    .insert(CLEANUP_HEADER, HeaderValue::from_static("failed"));
            }
            response
        }
        SendOutcome::Failed { reason, .. } => error_response(&failure_to_app_error(reason)),
    }
}
