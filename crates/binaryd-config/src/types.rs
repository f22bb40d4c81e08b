//! Command table types

use std::time::Duration;

use binaryd_process::CommandSpec;
use serde::Serialize;

/// INI section that never defines a command
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// One operator-defined command
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandConfig {
    /// Name used in the URL path
    pub name: String,
    /// Command line handed to the executor
    pub command: String,
    /// Interpreter reading the command text on stdin
    pub shell: Option<String>,
    /// Per-command timeout overriding the server default
    pub timeout: Option<Duration>,
}

impl CommandConfig {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            shell: None,
            timeout: None,
        }
    }

    /// Build the executor input, falling back to `default_timeout`
    pub fn to_spec(&self, default_timeout: Duration) -> binaryd_process::Result<CommandSpec> {
        let spec = CommandSpec::new(&self.command, self.timeout.unwrap_or(default_timeout))?;
        Ok(match &self.shell {
            Some(shell) => spec.shell(shell.as_str()),
            None => spec,
        })
    }
}

/// The full command table in definition order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandsConfig {
    commands: Vec<CommandConfig>,
}

impl CommandsConfig {
    /// Later entries reusing an earlier name replace it in place
    pub fn new(commands: Vec<CommandConfig>) -> Self {
        let mut table: Vec<CommandConfig> = Vec::with_capacity(commands.len());
        for command in commands {
            match table.iter_mut().find(|c| c.name == command.name) {
                Some(existing) => *existing = command,
                None => table.push(command),
            }
        }
        Self { commands: table }
    }

    /// Look up a command by its exact, case-sensitive name
    pub fn get(&self, name: &str) -> Option<&CommandConfig> {
        self.commands.iter().find(|c| c.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandConfig> {
        self.commands.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
