//! # binaryd-process
//!
//! **Purpose**: Command execution core for binaryd
//!
//! Runs one operator-defined command per call and always hands back a
//! [`CommandResult`], whatever happened to the child.
//!
//! ## Features
//!
//! - **Command Resolution**: POSIX word splitting, or an interposed shell that
//!   reads the command text from stdin
//! - **Isolation**: Empty environment, own process group per child
//! - **Output Capture**: stdout and stderr collected into one buffer
//! - **Deadlines**: Per-call timeout derived from an upstream cancellation token
//! - **Process Tree Kill**: Whole process group killed on timeout or shutdown
//! - **Status Taxonomy**: Stable exit codes for timeouts and spawn failures
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use binaryd_process::{execute, CommandSpec};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let shutdown = CancellationToken::new();
//! let spec = CommandSpec::new("/usr/bin/ps -eaf", Duration::from_secs(5))?;
//!
//! let result = execute(spec, &shutdown).await;
//! println!("rc={} {}", result.rc(), result.output);
//! # Ok(())
//! # }
//! ```

pub mod argv;
pub mod deadline;
pub mod error;
pub mod executor;
pub mod kill;
pub mod result;
pub mod spec;

pub use argv::{resolve_command, tokenize, ResolvedCommand};
pub use deadline::{Cause, Deadline};
pub use error::{ProcessError, Result};
pub use executor::execute;
pub use kill::kill_process_group;
pub use result::{CommandResult, Outcome, StatusCode};
pub use spec::CommandSpec;
pub use tokio_util::sync::CancellationToken;
