//! binaryd entry point

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use binaryd_config::ConfigLoader;
use binaryd_server::{shutdown_signal, ApiServer, ServerSettings};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// HTTP wrapper to execute pre-defined commands
#[derive(Debug, Parser)]
#[command(name = "binaryd", version, about)]
struct Cli {
    /// INI file defining the commands
    #[arg(default_value = "./binaryd.ini")]
    config: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0:9099")]
    listen: SocketAddr,

    /// Seconds before a command without its own timeout is killed
    #[arg(long, default_value_t = 300, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Seconds in-flight requests may take to finish after a shutdown signal
    #[arg(long, default_value_t = 5)]
    shutdown_grace: u64,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn settings(&self) -> ServerSettings {
        ServerSettings {
            listen: self.listen,
            default_timeout: Duration::from_secs(self.timeout),
            shutdown_grace: Duration::from_secs(self.shutdown_grace),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let commands = ConfigLoader::with_path(&cli.config)
        .load()
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    let settings = cli.settings();
    let shutdown = CancellationToken::new();
    let server = ApiServer::new(commands, &settings, shutdown.clone());
    let listener = ApiServer::bind(settings.listen)
        .await
        .with_context(|| format!("Failed to bind {}", settings.listen))?;

    let mut handle = tokio::spawn(server.run(listener));

    tokio::select! {
        finished = &mut handle => {
            finished.context("Webserver task panicked")??;
            return Ok(());
        }
        _ = shutdown_signal() => {}
    }

    // Cancelling the token also kills every running command's process group
    shutdown.cancel();
    match tokio::time::timeout(settings.shutdown_grace, &mut handle).await {
        Ok(finished) => finished.context("Webserver task panicked")??,
        Err(_) => {
            warn!(grace = ?settings.shutdown_grace, "In-flight requests did not finish in time");
            handle.abort();
        }
    }

    info!("Web server shutdown");
    Ok(())
}
