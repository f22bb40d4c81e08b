//! Server lifecycle: bind, serve, drain on shutdown

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use binaryd_config::CommandsConfig;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::{error::ApiResult, routes::all_routes, state::AppState};

/// Process-level settings that do not come from the INI file
#[derive(Debug, Clone)]
pub struct ServerSettings {
    /// Address to listen on
    pub listen: SocketAddr,
    /// Timeout for commands that do not set their own
    pub default_timeout: Duration,
    /// How long in-flight requests may drain after a shutdown signal
    pub shutdown_grace: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 9099)),
            default_timeout: Duration::from_secs(300),
            shutdown_grace: Duration::from_secs(5),
        }
    }
}

/// binaryd HTTP server
pub struct ApiServer {
    state: AppState,
}

impl ApiServer {
    /// The server stops once `shutdown` is cancelled, and every command it
    /// runs is killed at the same moment.
    pub fn new(commands: CommandsConfig, settings: &ServerSettings, shutdown: CancellationToken) -> Self {
        Self {
            state: AppState::new(commands, settings.default_timeout, shutdown),
        }
    }

    /// Router with all routes and middleware attached
    pub fn router(&self) -> Router {
        all_routes(self.state.clone())
    }

    /// Bind a listener for [`ApiServer::run`]
    pub async fn bind(addr: SocketAddr) -> ApiResult<TcpListener> {
        Ok(TcpListener::bind(addr).await?)
    }

    /// Serve until the shutdown token is cancelled, then drain in-flight
    /// requests
    pub async fn run(self, listener: TcpListener) -> ApiResult<()> {
        let router = self.router();
        let shutdown = self.state.shutdown.clone();

        info!(
            addr = %listener.local_addr()?,
            commands = self.state.commands.len(),
            "Webserver: Handler waiting for input"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .inspect_err(|e| error!(error = %e, "Webserver stopped with error"))?;

        info!(uptime_secs = self.state.uptime_seconds(), "Webserver: Handler stopped");
        Ok(())
    }
}

/// Resolve on SIGINT, or SIGTERM on Unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received shutdown signal (SIGINT)"),
        _ = terminate => info!("Received shutdown signal (SIGTERM)"),
    }
}
