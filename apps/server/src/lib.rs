//! # Incident Hub Server
//!
//! Hosts the admin dashboard API and the account/evidence functions on `Axum`,
//! backed by `SurrealDB` and an in-process change feed.
//!
//! ## Example
//! ```no_run
//! use brgy_server::Server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Server::builder()
//!         .port(8080)
//!         .build()
//!         .await?
//!         .run()
//!         .await
//! }
//! ```

pub mod router;

use anyhow::{Context, Result, anyhow};
use axum_server::Handle;
use brgy::domain::config::ApiConfig;
use brgy::kernel::server::ApiState;
use brgy_database::Database;
use brgy_event_bus::EventBus;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

const GRACEFUL_SHUTDOWN: Duration = Duration::from_secs(30);

/// A fluent builder for configuring and initializing the [`Server`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct ServerBuilder {
    cfg: ApiConfig,
}

impl ServerBuilder {
    pub fn config(mut self, cfg: ApiConfig) -> Self {
        self.cfg = cfg;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.cfg.server.port = port;
        self
    }

    async fn init_database(&self) -> Result<Database> {
        let db_cfg = &self.cfg.database;
        let mut builder =
            Database::builder().url(&db_cfg.url).session(&db_cfg.namespace, &db_cfg.database);

        if let Some(creds) = &db_cfg.credentials {
            builder = builder.auth(&creds.username, &creds.password);
        }

        builder.init().await.context("Failed to establish database connection")
    }

    fn validate_ssl_config(&self) -> Result<()> {
        let Some(ssl) = &self.cfg.server.ssl else {
            return Ok(());
        };
        if !ssl.cert.exists() {
            anyhow::bail!("SSL certificate not found at: {}", ssl.cert.display());
        }
        if !ssl.key.exists() {
            anyhow::bail!("SSL key not found at: {}", ssl.key.display());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if ssl.key.metadata()?.permissions().mode() & 0o077 != 0 {
                warn!(key = %ssl.key.display(), "SSL private key is readable by other users (should be 600)");
            }
        }
        Ok(())
    }

    /// Consumes the builder and wires every component.
    ///
    /// Order: SSL check, database (with schema migrations), change feed, feature slices,
    /// then the request state that carries them.
    ///
    /// # Errors
    /// * The SSL certificate or key is missing.
    /// * The database is unreachable or rejects the credentials.
    /// * A slice rejects its configuration (e.g. an empty JWT secret).
    pub async fn build(self) -> Result<Server> {
        self.validate_ssl_config()?;

        let address = SocketAddr::new(self.cfg.server.address, self.cfg.server.port);
        info!(%address, "Initializing server");

        let db = self.init_database().await?;
        let events = EventBus::with_capacity(self.cfg.realtime.channel_capacity)
            .context("Invalid realtime.channel_capacity")?;
        let slices = brgy::init(&self.cfg, &db, &events)
            .map_err(|e| anyhow!("Platform bootstrap failed: {e}"))?;

        let state = ApiState::builder()
            .config(self.cfg)
            .db(db)
            .events(events)
            .register_slices(slices)
            .build()
            .context("Failed to finalize API state registry")?;
        Ok(Server { state })
    }
}

/// A fully initialized server, returned by [`ServerBuilder::build`].
#[must_use = "call .run().await to start the server"]
#[derive(Debug)]
pub struct Server {
    state: ApiState,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::default()
    }

    /// Serves HTTP (or HTTPS when `server.ssl` is set) until SIGINT/SIGTERM.
    ///
    /// In-flight requests get [`GRACEFUL_SHUTDOWN`] to finish; open change streams end
    /// when the feed is closed afterwards.
    ///
    /// # Errors
    /// Returns an error if binding the address or loading the TLS material fails.
    pub async fn run(self) -> Result<()> {
        let cfg = self.state.config.clone();
        let events = self.state.events.clone();
        let address = SocketAddr::new(cfg.server.address, cfg.server.port);

        let app = router::init(self.state);

        let handle = Handle::<SocketAddr>::new();
        let shutdown_handle = handle.clone();
        let feed = events.clone();
        tokio::spawn(async move {
            if let Err(e) = shutdown_signal().await {
                error!("Error while waiting for shutdown signal: {e}");
                return;
            }
            info!("Shutdown signal received, starting graceful shutdown...");
            let closed = feed.shutdown();
            info!(channels = closed, "Change feed closed");
            shutdown_handle.graceful_shutdown(Some(GRACEFUL_SHUTDOWN));
        });

        if let Some(ssl) = &cfg.server.ssl {
            info!("Starting HTTPS server on https://{address}");
            let tls = axum_server::tls_rustls::RustlsConfig::from_pem_file(&ssl.cert, &ssl.key)
                .await
                .context("Failed to load SSL/TLS certificates")?;

            axum_server::bind_rustls(address, tls)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        } else {
            info!("Starting HTTP server on http://{address}");
            axum_server::bind(address)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .context("HTTP server failed")?;
        }

        info!("Server shutdown complete");
        Ok(())
    }

    #[must_use]
    pub const fn state(&self) -> &ApiState {
        &self.state
    }
}

/// Resolves on SIGINT (Ctrl+C) or SIGTERM.
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
        res = ctrl_c => res?,
        res = terminate => res?,
    }

    Ok(())
}
