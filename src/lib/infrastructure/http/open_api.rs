//! OpenAPI module

use utoipa::OpenApi;

use crate::infrastructure::http::{
    errors::ErrorResponse,
    handlers::{diagnostics, email},
};

/// OpenAPI document for the service
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "Email Server API", description = "A simple API for sending emails"),
    paths(
        email::send::handler,
        diagnostics::send_test_email::handler,
        diagnostics::service_info::handler
    ),
    components(schemas(
        email::send::SendEmailBody,
        email::send::SendEmailResponse,
        diagnostics::send_test_email::SendTestEmailResponse,
        diagnostics::send_test_email::TestEmailDetails,
        diagnostics::service_info::ServiceInfoResponse,
        diagnostics::service_info::Endpoint,
        ErrorResponse,
    ))
)]
pub struct ApiDocs;
