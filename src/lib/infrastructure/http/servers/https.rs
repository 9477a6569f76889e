//! HTTPS application server

use std::net::{SocketAddr, TcpListener};

use anyhow::{Context, Result};
use axum::{async_trait, Router};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{debug, info};

use crate::infrastructure::http::{shutdown_signal, Server};

/// The application's HTTPS server
#[derive(Debug)]
pub struct HttpsServer {
    router: Router,
    listener: TcpListener,
    tls_config: RustlsConfig,
}

impl HttpsServer {
    /// Returns a new HTTPS server serving `router` on `address`.
    ///
    /// The port is bound before the certificate is loaded, so a busy port
    /// fails here rather than once the server is running.
    pub async fn new(
        address: SocketAddr,
        cert_path: &str,
        key_path: &str,
        router: Router,
    ) -> Result<Self> {
        let listener = TcpListener::bind(address)
            .with_context(|| format!("failed to listen on {address}"))?;

        listener
            .set_nonblocking(true)
            .context("failed to configure listener")?;

        let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .context("failed to load TLS config")?;

        Ok(Self {
            router,
            listener,
            tls_config,
        })
    }
}

#[async_trait]
impl Server for HttpsServer {
    #[mutants::skip]
    async fn run(self) -> Result<()> {
        debug!(
            "HTTPS Server listening on {}",
            self.listener
                .local_addr()
                .context("failed to get local address")?
        );

        let handle = Handle::new();

        let server = axum_server::from_tcp_rustls(self.listener, self.tls_config)
            .handle(handle.clone())
            .serve(self.router.into_make_service());

        tokio::select! {
            result = server => result.context("server error")?,
            _ = shutdown_signal(Some(handle)) => {
                info!("Shutting down HTTPS server");
            }
        }

        Ok(())
    }
}
