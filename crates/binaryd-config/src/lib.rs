//! binaryd configuration
//!
//! Loads the operator's command table from an INI file. Every section names
//! one command:
//!
//! ```ini
//! [ps]
//! command = /usr/bin/ps -eaf
//!
//! [disk]
//! command = df -h | sort
//! shell = /bin/sh
//! timeout = 30
//! ```

pub mod error;
pub mod manager;
pub mod types;

pub use error::{ConfigError, Result};
pub use manager::ConfigLoader;
pub use types::{CommandConfig, CommandsConfig, DEFAULT_SECTION};
