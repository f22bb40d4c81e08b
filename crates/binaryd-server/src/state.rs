//! Application state for the HTTP server

use std::sync::Arc;
use std::time::{Duration, Instant};

use binaryd_config::{CommandConfig, CommandsConfig};
use binaryd_process::{execute, CommandResult};
use tokio_util::sync::CancellationToken;

use crate::error::ApiResult;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Operator-defined commands
    pub commands: Arc<CommandsConfig>,
    /// Timeout for commands without their own
    pub default_timeout: Duration,
    /// Cancelled when the server shuts down; kills in-flight commands
    pub shutdown: CancellationToken,
    /// Server start time for uptime calculation
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        commands: CommandsConfig,
        default_timeout: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            commands: Arc::new(commands),
            default_timeout,
            shutdown,
            start_time: Instant::now(),
        }
    }

    /// Run a configured command under the server's shutdown token
    pub async fn run_command(&self, command: &CommandConfig) -> ApiResult<CommandResult> {
        let spec = command.to_spec(self.default_timeout)?;
        tracing::debug!(name = %command.name, command = %command.command, "Executing command");
        Ok(execute(spec, &self.shutdown).await)
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
