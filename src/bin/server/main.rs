#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::missing_crate_level_docs
)]

//! Email relay REST API

use std::net::{Ipv4Addr, SocketAddr};

use anyhow::{anyhow, Result};
use clap::Parser;
use email_relay::infrastructure::{
    email::smtp::{SMTPConfig, SMTPMailer},
    http::{
        router,
        servers::{
            http::{redirect_router, HttpServer},
            https::HttpsServer,
        },
        state::AppState,
        HttpServerConfig, Server,
    },
};
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Command-line arguments / environment variables
#[derive(Debug, Parser)]
pub struct Args {
    /// The HTTP server configuration
    #[clap(flatten)]
    pub server: HttpServerConfig,

    /// The SMTP relay configuration
    #[clap(flatten)]
    pub smtp: SMTPConfig,
}

#[mutants::skip]
#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to load environment: {}", e);

            return Err(e.into());
        }
    }

    tracing_subscriber::fmt::init();

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow!("failed to install the rustls crypto provider"))?;

    let args = Args::parse();

    let mailer = SMTPMailer::new(args.smtp)?;
    let app = router(AppState::new(mailer));

    let http_address = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), args.server.http_port);

    let Some((cert_path, key_path)) = args.server.tls_paths() else {
        warn!("No TLS certificate configured, serving the API over plain HTTP");

        return HttpServer::new(http_address, app)?.run().await;
    };

    let https_address = SocketAddr::new(Ipv4Addr::UNSPECIFIED.into(), args.server.https_port);

    info!("Redirecting HTTP requests to {}", args.server.base_url);

    let mut servers = JoinSet::new();

    servers.spawn(
        HttpServer::new(http_address, redirect_router(args.server.base_url.clone()))?.run(),
    );
    servers.spawn(
        HttpsServer::new(https_address, cert_path, key_path, app)
            .await?
            .run(),
    );

    // the first failure stops the process; dropping the set aborts the other server
    while let Some(result) = servers.join_next().await {
        result??;
    }

    Ok(())
}
