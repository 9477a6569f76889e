//! API handler modules

use std::any::Any;

use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    domain::communication::mailer::Mailer,
    infrastructure::http::{errors::ErrorResponse, open_api::ApiDocs, state::AppState},
};

pub mod diagnostics;
pub mod docs;
pub mod email;

/// Routes served under `/api`
pub fn api_router<M: Mailer>() -> Router<AppState<M>> {
    Router::new()
        .route("/email/send", post(email::send::handler::<M>))
        .route(
            "/test/send-test-email",
            post(diagnostics::send_test_email::handler::<M>),
        )
        .route(
            "/test/service-info",
            get(diagnostics::service_info::handler::<M>),
        )
}

/// Documentation routes
pub fn docs_router<M: Mailer>() -> Router<AppState<M>> {
    Router::new()
        .route("/", get(docs::handler))
        .route("/openapi.json", get(Json(ApiDocs::openapi())))
}

/// Catch panics and return a 500 error
pub fn panic_handler(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    };

    let error = ErrorResponse {
        message: "Internal server error".to_string(),
        error: Some(details),
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
}
