//! Command results and the status code taxonomy

use std::fmt;

use serde::{Serialize, Serializer};

/// Unified exit codes.
///
/// The named variants follow the monitoring-plugin convention; any other
/// exit code reported by a finished process is carried verbatim in `Exit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Ok,
    Warning,
    Critical,
    Unknown,
    Timeout,
    NotExecutable,
    NotFound,
    Exit(i32),
}

impl StatusCode {
    /// Numeric value reported to clients
    pub fn code(self) -> i32 {
        match self {
            StatusCode::Ok => 0,
            StatusCode::Warning => 1,
            StatusCode::Critical => 2,
            StatusCode::Unknown => 3,
            StatusCode::Timeout => 124,
            StatusCode::NotExecutable => 126,
            StatusCode::NotFound => 127,
            StatusCode::Exit(code) => code,
        }
    }
}

impl From<i32> for StatusCode {
    fn from(code: i32) -> Self {
        match code {
            0 => StatusCode::Ok,
            1 => StatusCode::Warning,
            2 => StatusCode::Critical,
            3 => StatusCode::Unknown,
            124 => StatusCode::Timeout,
            126 => StatusCode::NotExecutable,
            127 => StatusCode::NotFound,
            other => StatusCode::Exit(other),
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for StatusCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.code())
    }
}

/// How an invocation ended.
///
/// Only `Completed` carries a genuine exit code; every other outcome has a
/// human readable explanation in [`CommandResult::output`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The process ran to completion (with any exit code)
    Completed,
    /// The deadline expired and the process group was killed
    TimeoutExceeded,
    /// The upstream token was cancelled and the process group was killed
    Cancelled,
    /// The executable does not exist
    ProcessNotFound,
    /// The executable exists but may not be executed
    ProcessNotExecutable,
    /// Spawning failed for another reason
    ProcessSpawnUnknown,
    /// The command line could not be split into words
    TokenizationFailed,
}

/// Result of a single invocation.
///
/// Serializes to `{"stdout", "rc", "execution_unix_timestamp_sec"}`; HTTP
/// clients depend on these field names.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    /// Combined stdout and stderr, or an explanation when nothing ran
    #[serde(rename = "stdout")]
    pub output: String,
    #[serde(rename = "rc")]
    pub status: StatusCode,
    /// Unix time at which the invocation started
    #[serde(rename = "execution_unix_timestamp_sec")]
    pub started_at: i64,
    #[serde(skip)]
    pub outcome: Outcome,
}

impl CommandResult {
    pub(crate) fn new(
        started_at: i64,
        outcome: Outcome,
        status: StatusCode,
        output: impl Into<String>,
    ) -> Self {
        Self {
            output: output.into(),
            status,
            started_at,
            outcome,
        }
    }

    /// Numeric status code
    pub fn rc(&self) -> i32 {
        self.status.code()
    }

    /// True when the process ran and exited with status 0
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Completed && self.status == StatusCode::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_named_codes() {
        assert_eq!(StatusCode::Ok.code(), 0);
        assert_eq!(StatusCode::Warning.code(), 1);
        assert_eq!(StatusCode::Critical.code(), 2);
        assert_eq!(StatusCode::Unknown.code(), 3);
        assert_eq!(StatusCode::Timeout.code(), 124);
        assert_eq!(StatusCode::NotExecutable.code(), 126);
        assert_eq!(StatusCode::NotFound.code(), 127);
    }

    #[test]
    fn test_json_field_names() {
        let result = CommandResult::new(
            1_700_000_000,
            Outcome::Completed,
            StatusCode::Exit(42),
            "hello\n",
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "stdout": "hello\n",
                "rc": 42,
                "execution_unix_timestamp_sec": 1_700_000_000i64,
            })
        );
    }

    proptest! {
        #[test]
        fn prop_raw_exit_code_is_preserved(code in 0i32..=255) {
            prop_assert_eq!(StatusCode::from(code).code(), code);
        }
    }
}
