//! Send email handler

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::{
    domain::communication::mailer::{EmailRequest, Mailer},
    infrastructure::http::{
        errors::{ApiError, ErrorResponse},
        state::AppState,
    },
};

/// Send email request body
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailBody {
    /// Semicolon-separated recipients
    #[serde(default)]
    #[schema(example = "first@example.com; second@example.com")]
    pub to: String,

    /// Semicolon-separated carbon-copy recipients
    #[schema(example = "cc@example.com")]
    pub cc: Option<String>,

    /// Semicolon-separated blind carbon-copy recipients
    #[schema(example = "bcc@example.com")]
    pub bcc: Option<String>,

    /// The subject line
    #[schema(example = "Hello")]
    pub subject: String,

    /// The message body
    #[schema(example = "<p>Hello there</p>")]
    pub body: String,

    /// Whether `body` is HTML
    #[serde(default)]
    pub is_html: bool,
}

impl From<SendEmailBody> for EmailRequest {
    fn from(body: SendEmailBody) -> Self {
        Self {
            to: body.to,
            cc: body.cc,
            bcc: body.bcc,
            subject: body.subject,
            body: body.body,
            is_html: body.is_html,
        }
    }
}

/// Send email response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendEmailResponse {
    #[schema(example = "Email sent successfully")]
    message: String,
}

/// Send an email
///
/// A `to` made only of whitespace counts as missing and is rejected with 400.
#[utoipa::path(
    post,
    operation_id = "send_email",
    tag = "Email",
    path = "/api/email/send",
    request_body = SendEmailBody,
    responses(
        (status = StatusCode::OK, description = "Email handed off to the SMTP server", body = SendEmailResponse),
        (status = StatusCode::BAD_REQUEST, description = "No recipient", body = ErrorResponse, example = json!({ "message": "At least one recipient is required" })),
        (status = StatusCode::INTERNAL_SERVER_ERROR, description = "Delivery failed", body = ErrorResponse, example = json!({ "message": "An error occurred while sending the email", "error": "Could not connect to the SMTP server: Connection refused" })),
    )
)]
pub async fn handler<M: Mailer>(
    State(state): State<AppState<M>>,
    request: Result<Json<SendEmailBody>, JsonRejection>,
) -> Result<(StatusCode, Json<SendEmailResponse>), ApiError> {
    let Json(request) = request?;

    if request.to.trim().is_empty() {
        return Err(ApiError::new_400("At least one recipient is required"));
    }

    let email: EmailRequest = request.into();

    state.mailer.send_email(&email).await.map_err(|err| {
        error!(error = %err, "error sending email");

        ApiError::new_500("An error occurred while sending the email").with_cause(err)
    })?;

    Ok((
        StatusCode::OK,
        Json(SendEmailResponse {
            message: "Email sent successfully".to_string(),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;
    use testresult::TestResult;

    use crate::{
        domain::communication::mailer::{tests::MockMailer, MailerError},
        infrastructure::http::{errors::ErrorResponse, router, state::tests::test_state},
    };

    use super::SendEmailResponse;

    #[tokio::test]
    async fn test_send_email_success() -> TestResult {
        let mut mailer = MockMailer::new();

        mailer
            .expect_send_email()
            .times(1)
            .withf(|email| {
                email.to == "a@x.com; b@x.com"
                    && email.cc.as_deref() == Some("c@x.com")
                    && email.bcc.is_none()
                    && email.subject == "Hi"
                    && email.body == "<b>hello</b>"
                    && email.is_html
            })
            .returning(|_| Ok(()));

        let response = TestServer::new(router(test_state(Some(mailer))))?
            .post("/api/email/send")
            .json(&json!({
                "to": "a@x.com; b@x.com",
                "cc": "c@x.com",
                "subject": "Hi",
                "body": "<b>hello</b>",
                "isHtml": true,
            }))
            .await;

        response.assert_status_ok();

        let json = response.json::<SendEmailResponse>();
        assert_eq!(json.message, "Email sent successfully");

        Ok(())
    }

    #[tokio::test]
    async fn test_send_email_defaults_to_plain_text() -> TestResult {
        let mut mailer = MockMailer::new();

        mailer
            .expect_send_email()
            .times(1)
            .withf(|email| !email.is_html)
            .returning(|_| Ok(()));

        let response = TestServer::new(router(test_state(Some(mailer))))?
            .post("/api/email/send")
            .json(&json!({ "to": "r@example.com", "subject": "Hi", "body": "hello" }))
            .await;

        response.assert_status_ok();

        Ok(())
    }

    #[tokio::test]
    async fn test_send_email_without_recipient() -> TestResult {
        let mut mailer = MockMailer::new();

        mailer.expect_send_email().times(0);

        let server = TestServer::new(router(test_state(Some(mailer))))?;

        for body in [
            json!({ "to": "", "subject": "Hi", "body": "hello" }),
            json!({ "to": "   ", "subject": "Hi", "body": "hello" }),
            json!({ "subject": "Hi", "body": "hello" }),
        ] {
            let response = server.post("/api/email/send").json(&body).await;

            response.assert_status(StatusCode::BAD_REQUEST);

            let json = response.json::<ErrorResponse>();
            assert_eq!(json.message, "At least one recipient is required");
        }

        Ok(())
    }

    #[tokio::test]
    async fn test_send_email_missing_subject() -> TestResult {
        let mut mailer = MockMailer::new();

        mailer.expect_send_email().times(0);

        let response = TestServer::new(router(test_state(Some(mailer))))?
            .post("/api/email/send")
            .json(&json!({ "to": "r@example.com", "body": "hello" }))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        Ok(())
    }

    #[tokio::test]
    async fn test_send_email_delivery_failure() -> TestResult {
        let mut mailer = MockMailer::new();

        mailer
            .expect_send_email()
            .times(1)
            .returning(|_| Err(MailerError::Transport("Connection refused".to_string())));

        let response = TestServer::new(router(test_state(Some(mailer))))?
            .post("/api/email/send")
            .json(&json!({ "to": "r@example.com", "subject": "Hi", "body": "hello" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let json = response.json::<ErrorResponse>();
        assert_eq!(json.message, "An error occurred while sending the email");
        assert_eq!(
            json.error.as_deref(),
            Some("Could not connect to the SMTP server: Connection refused")
        );

        Ok(())
    }
}
