//! Command specification

use std::time::Duration;

use crate::error::{ProcessError, Result};

/// Everything the executor needs to run one command.
///
/// Built once per invocation and never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    command: String,
    shell: Option<String>,
    timeout: Duration,
    stdin: Option<String>,
}

impl CommandSpec {
    /// Create a specification for `command` with a hard `timeout`.
    ///
    /// Fails when the command is blank or the timeout is zero.
    pub fn new(command: impl Into<String>, timeout: Duration) -> Result<Self> {
        let command = command.into();
        if command.trim().is_empty() {
            return Err(ProcessError::InvalidSpec(
                "command must not be empty".to_string(),
            ));
        }
        if timeout.is_zero() {
            return Err(ProcessError::InvalidSpec(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            command,
            shell: None,
            timeout,
            stdin: None,
        })
    }

    /// Run the command through `shell`, which reads the command text on stdin
    pub fn shell(mut self, shell: impl Into<String>) -> Self {
        let shell = shell.into();
        self.shell = (!shell.is_empty()).then_some(shell);
        self
    }

    /// Feed `data` to the child's standard input
    pub fn stdin(mut self, data: impl Into<String>) -> Self {
        let data = data.into();
        self.stdin = (!data.is_empty()).then_some(data);
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn shell_path(&self) -> Option<&str> {
        self.shell.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn stdin_data(&self) -> Option<&str> {
        self.stdin.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_command() {
        let err = CommandSpec::new("   ", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ProcessError::InvalidSpec(_)));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = CommandSpec::new("whoami", Duration::ZERO).unwrap_err();
        assert!(matches!(err, ProcessError::InvalidSpec(_)));
    }

    #[test]
    fn test_empty_shell_and_stdin_are_unset() {
        let spec = CommandSpec::new("whoami", Duration::from_secs(1))
            .unwrap()
            .shell("")
            .stdin("");
        assert_eq!(spec.shell_path(), None);
        assert_eq!(spec.stdin_data(), None);
    }
}
