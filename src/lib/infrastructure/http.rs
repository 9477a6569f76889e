//! HTTP Server

use std::time::Duration;

use anyhow::Result;
use axum::{async_trait, extract::Request, Router};
use axum_server::Handle;
use clap::Parser;
use tokio::signal;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{debug, info_span};

use crate::domain::communication::mailer::Mailer;

pub mod errors;
pub mod handlers;
pub mod servers;
pub mod state;

mod open_api;

use handlers::{api_router, docs_router, panic_handler};
use state::AppState;

/// Configuration for the HTTP servers.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
pub struct HttpServerConfig {
    /// The port for plain HTTP
    #[arg(long, env = "HTTP_PORT", default_value_t = 5000)]
    pub http_port: u16,

    /// The port for HTTPS, used when a certificate is configured
    #[arg(long, env = "HTTPS_PORT", default_value_t = 5001)]
    pub https_port: u16,

    /// PEM certificate for HTTPS
    #[arg(long, env = "TLS_CERT_PATH", requires = "key_path")]
    pub cert_path: Option<String>,

    /// PEM private key for HTTPS
    #[arg(long, env = "TLS_KEY_PATH", requires = "cert_path")]
    pub key_path: Option<String>,

    /// Public HTTPS URL that plain HTTP requests are redirected to
    #[arg(long, env = "BASE_URL", default_value = "https://localhost:5001")]
    pub base_url: String,
}

impl HttpServerConfig {
    /// Certificate and key paths, when HTTPS is enabled
    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        match (&self.cert_path, &self.key_path) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }
}

/// A runnable server
#[async_trait]
pub trait Server {
    /// Serves until a shutdown signal arrives
    async fn run(self) -> Result<()>;
}

/// Create the application's router
pub fn router<M: Mailer>(state: AppState<M>) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        let uri = request.uri().to_string();
        info_span!("http_request", method = ?request.method(), uri)
    });

    Router::new()
        .merge(docs_router::<M>())
        .nest("/api", api_router::<M>())
        .layer(CatchPanicLayer::custom(panic_handler))
        .layer(trace_layer)
        .with_state(state)
}

#[mutants::skip]
pub(crate) async fn shutdown_signal(handle: Option<Handle>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    if let Some(handle) = handle {
        debug!("shutting down gracefully");
        handle.graceful_shutdown(Some(Duration::from_secs(10)));
    }
}
