//! Service info handler

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{domain::communication::mailer::Mailer, infrastructure::http::state::AppState};

/// An endpoint exposed by the service
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Endpoint {
    #[schema(example = "POST")]
    method: String,

    #[schema(example = "/api/email/send")]
    path: String,

    #[schema(example = "Send an email")]
    description: String,
}

impl Endpoint {
    fn new(method: &str, path: &str, description: &str) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            description: description.to_string(),
        }
    }
}

/// The service info response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfoResponse {
    #[schema(example = "Email Server")]
    service: String,

    #[schema(example = "1.0.0")]
    version: String,

    #[schema(example = "Running")]
    status: String,

    timestamp: DateTime<Utc>,

    /// Seconds since the server started
    #[schema(example = 123)]
    uptime: i64,

    endpoints: Vec<Endpoint>,
}

/// Get information about the email service
#[utoipa::path(
    get,
    operation_id = "service_info",
    tag = "Test",
    path = "/api/test/service-info",
    responses(
        (status = 200, description = "Service information", body = ServiceInfoResponse),
    )
)]
pub async fn handler<M: Mailer>(State(state): State<AppState<M>>) -> Json<ServiceInfoResponse> {
    let now = Utc::now();

    Json(ServiceInfoResponse {
        service: "Email Server".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "Running".to_string(),
        timestamp: now,
        uptime: now.timestamp() - state.start_time.timestamp(),
        endpoints: vec![
            Endpoint::new("POST", "/api/email/send", "Send an email"),
            Endpoint::new("POST", "/api/test/send-test-email", "Send a test email"),
            Endpoint::new("GET", "/api/test/service-info", "Get service information"),
        ],
    })
}
