//! Send test email handler

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::{
    domain::communication::mailer::{EmailRequest, Mailer},
    infrastructure::http::state::AppState,
};

/// Subject of the canned test email
pub const TEST_EMAIL_SUBJECT: &str = "Test Email from Email Server";

/// Query parameters
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendTestEmailParams {
    #[serde(default = "default_recipient")]
    recipient_email: String,
}

fn default_recipient() -> String {
    "recipient@example.com".to_string()
}

/// Where and when the test email went
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestEmailDetails {
    #[schema(example = "recipient@example.com")]
    to: String,
    sent_at: DateTime<Utc>,
}

/// Send test email response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendTestEmailResponse {
    success: bool,

    #[schema(example = "Test email sent successfully!")]
    message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<TestEmailDetails>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Send a canned HTML email to check the SMTP setup
#[utoipa::path(
    post,
    operation_id = "send_test_email",
    tag = "Test",
    path = "/api/test/send-test-email",
    params(
        ("recipientEmail" = Option<String>, Query, description = "The recipient of the test email", example = "recipient@example.com"),
    ),
    responses(
        (status = StatusCode::OK, description = "Test email sent", body = SendTestEmailResponse),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Delivery failed", body = SendTestEmailResponse, example = json!({ "success": false, "message": "Failed to send test email", "error": "Could not connect to the SMTP server: Connection refused" })),
    )
)]
pub async fn handler<M: Mailer>(
    State(state): State<AppState<M>>,
    Query(params): Query<SendTestEmailParams>,
) -> (StatusCode, Json<SendTestEmailResponse>) {
    let email = test_email(&params.recipient_email, Utc::now());

    match state.mailer.send_email(&email).await {
        Ok(()) => (
            StatusCode::OK,
            Json(SendTestEmailResponse {
                success: true,
                message: "Test email sent successfully!".to_string(),
                details: Some(TestEmailDetails {
                    to: params.recipient_email,
                    sent_at: Utc::now(),
                }),
                error: None,
            }),
        ),
        Err(err) => {
            error!(error = %err, "error sending test email");

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SendTestEmailResponse {
                    success: false,
                    message: "Failed to send test email".to_string(),
                    details: None,
                    error: Some(err.to_string()),
                }),
            )
        }
    }
}

fn test_email(recipient: &str, now: DateTime<Utc>) -> EmailRequest {
    EmailRequest {
        to: recipient.to_string(),
        subject: TEST_EMAIL_SUBJECT.to_string(),
        body: format!(
            "<h1>Hello from Email Server!</h1>\
             <p>This is a <strong>test email</strong> sent from our email service.</p>\
             <p>Current time: {}</p>",
            now.format("%A, %B %-d, %Y %H:%M:%S UTC")
        ),
        is_html: true,
        ..Default::default()
    }
}
