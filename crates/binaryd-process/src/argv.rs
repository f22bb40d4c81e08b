//! Command line resolution

use crate::{
    error::{ProcessError, Result},
    spec::CommandSpec,
};

/// Program, arguments and stdin payload derived from a [`CommandSpec`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub argv: Vec<String>,
    pub stdin: String,
}

impl ResolvedCommand {
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    /// Argv joined with single spaces, used in diagnostics
    pub fn display(&self) -> String {
        self.argv.join(" ")
    }
}

/// Split `command` into words following POSIX shell quoting rules
pub fn tokenize(command: &str) -> Result<Vec<String>> {
    let words = shell_words::split(command).map_err(|e| ProcessError::Tokenize(e.to_string()))?;
    if words.is_empty() {
        return Err(ProcessError::Tokenize("command is empty".to_string()));
    }
    Ok(words)
}

/// Work out what to spawn and what to write to its stdin.
///
/// Without a shell the command is split into argv. With a shell the shell is
/// spawned alone and reads the command text from stdin. Explicit stdin data
/// wins in both cases.
pub fn resolve_command(spec: &CommandSpec) -> Result<ResolvedCommand> {
    let (argv, stdin) = match spec.shell_path() {
        None => (tokenize(spec.command())?, String::new()),
        Some(shell) => (vec![shell.to_string()], spec.command().to_string()),
    };

    let stdin = match spec.stdin_data() {
        Some(data) => data.to_string(),
        None => stdin,
    };

    Ok(ResolvedCommand { argv, stdin })
}
