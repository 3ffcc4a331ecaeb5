//! # Verneg Server
//!
//! Sample `Axum` service exposing a people resource whose response shape depends on the
//! `api-version` request header.
//!
//! * `GET /api/versioned/{id}` returns one person.
//! * `GET /api/versioned` returns all people.
//!
//! Without a version (or with an unknown one) people are served as stored; version `2` serves
//! [`people::PersonV2`].
//!
//! ## Example
//! ```no_run
//! use verneg_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(4583)
//!         .build()?
//!         .run()
//!         .await
//! }
//! ```

pub mod config;
pub mod people;
pub mod router;

use crate::config::AppConfig;
use anyhow::{Context, Result};
use axum::Router;
use axum_server::Handle;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: AppConfig,
}

impl ServerBuilder {
    /// Set up the server's configuration.
    pub fn config(mut self, cfg: AppConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    /// Consumes the builder and assembles the router.
    ///
    /// # Errors
    /// Returns an error if the versioning section is unusable, e.g. an invalid header name.
    pub fn build(self) -> Result<Server> {
        let address = self.cfg.server.socket_addr();
        info!(%address, version_header = %self.cfg.versioning.header, "Initializing server");

        let app = router::init(&self.cfg).context("Failed to build the application router")?;
        Ok(Server { cfg: self.cfg, app })
    }
}

/// A fully initialized server instance ready to run.
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    cfg: AppConfig,
    app: Router,
}

impl Server {
    /// Returns a new [`ServerBuilder`] to configure the server.
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Starts the server and runs until the shutdown signal is received.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the configured address.
    pub async fn run(self) -> Result<()> {
        let address = self.cfg.server.socket_addr();
        let grace = Duration::from_secs(self.cfg.server.shutdown_grace_seconds);

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();

        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            shutdown_handle.graceful_shutdown(Some(grace));
        });

        info!("Starting HTTP server on http://{address}");

        axum_server::bind(address)
            .handle(handle)
            .serve(self.app.into_make_service())
            .await
            .context("HTTP server failed")?;

        info!("Server shutdown complete");
        Ok(())
    }

    #[must_use]
    pub const fn config(&self) -> &AppConfig {
        &self.cfg
    }

    /// The assembled router, for driving the service without binding a socket.
    #[must_use]
    pub fn router(&self) -> Router {
        self.app.clone()
    }
}

/// Listens for shutdown signals (Ctrl+C, SIGTERM).
async fn shutdown_signal() -> Result<()> {
    let ctrl_c = async { signal::ctrl_c().await.context("Failed to install Ctrl+C handler") };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("Failed to install SIGTERM handler")?
            .recv()
            .await;
        Ok::<_, anyhow::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            res.context("Ctrl+C signal received")?;
        },
        res = terminate => {
            res.context("SIGTERM signal received")?;
        },
    }

    Ok(())
}
