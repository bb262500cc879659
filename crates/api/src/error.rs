//! Error-to-response mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mailgate_core::dispatch::SendFailure;
use mailgate_shared::AppError;
use serde_json::json;

/// Converts a pipeline failure into the caller-facing error.
pub fn failure_to_app_error(failure: &SendFailure) -> AppError {
    let message = failure.to_string();
    match failure {
        SendFailure::InvalidInput(_) => AppError::Validation(message),
        SendFailure::CredentialAcquisition(_) => AppError::Credential(message),
        SendFailure::Configuration(_) => AppError::Configuration(message),
        SendFailure::Send(_) => AppError::Delivery(message),
        SendFailure::SendTimeout(_) => AppError::Timeout(message),
    }
}

/// Renders `{"error": <code>, "message": <text>}` with the error's status.
pub fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailgate_core::dispatch::CredentialError;
    use mailgate_shared::ConfigurationError;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[case(SendFailure::InvalidInput("x".into()), 400, "VALIDATION_ERROR")]
    #[case(
        SendFailure::CredentialAcquisition(CredentialError::Network("x".into())),
        502,
        "CREDENTIAL_ERROR"
    )]
    #[case(
        SendFailure::CredentialAcquisition(CredentialError::Timeout(Duration::from_secs(1))),
        502,
        "CREDENTIAL_ERROR"
    )]
    #[case(
        SendFailure::Configuration(ConfigurationError::Missing("mail.sender")),
        500,
        "CONFIGURATION_ERROR"
    )]
    #[case(SendFailure::Send("x".into()), 502, "DELIVERY_ERROR")]
    #[case(SendFailure::SendTimeout(Duration::from_secs(1)), 504, "TIMEOUT")]
    fn test_failure_mapping(
        #[case] failure: SendFailure,
        #[case] status: u16,
        #[case] code: &str,
    ) {
        let err = failure_to_app_error(&failure);

        assert_eq!(err.status_code(), status);
        assert_eq!(err.error_code(), code);
    }

    #[test]
    fn test_error_response_status() {
        let response = error_response(&AppError::Validation("recipient required".into()));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
