//! Command execution with deadlines and process-group cleanup

use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    argv::{resolve_command, ResolvedCommand},
    deadline::{Cause, Deadline},
    kill::{kill_process_group, GroupGuard},
    result::{CommandResult, Outcome, StatusCode},
    spec::CommandSpec,
};

#[cfg(unix)]
use crate::kill::PROCESS_GROUP;

const READ_CHUNK: usize = 8192;

/// What a finished child left behind
struct Finished {
    status: ExitStatus,
    output: Vec<u8>,
}

/// Run the command to completion and classify the outcome.
///
/// The child runs in its own process group with an empty environment. When
/// the timeout elapses or `parent` is cancelled the whole group is killed,
/// and the call still waits for the child to be reaped before returning.
/// Expected failures (missing binary, permission denied, timeout, bad
/// quoting) are reported through the returned status code, never as errors.
pub async fn execute(spec: CommandSpec, parent: &CancellationToken) -> CommandResult {
    let started_at = chrono::Utc::now().timestamp();
    let deadline = Deadline::new(parent, spec.timeout());

    let resolved = match resolve_command(&spec) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(command = %spec.command(), error = %e, "Failed to parse command line");
            return CommandResult::new(
                started_at,
                Outcome::TokenizationFailed,
                StatusCode::Unknown,
                e.to_string(),
            );
        }
    };
    let argv_text = resolved.display();

    let start = Instant::now();
    let run = run(&resolved, &deadline).await;

    // A blown deadline beats everything else, including spawn errors
    if deadline.is_exceeded() {
        warn!(command = %argv_text, timeout = ?spec.timeout(), "Command timed out");
        return CommandResult::new(
            started_at,
            Outcome::TimeoutExceeded,
            StatusCode::Timeout,
            format!(
                "Command {} timed out after {} seconds",
                argv_text,
                format_seconds(spec.timeout())
            ),
        );
    }

    let finished = match run {
        Ok(finished) => finished,
        Err(e) => {
            let (outcome, status, message) = classify_spawn_error(&e, &argv_text);
            warn!(command = %argv_text, error = %e, rc = %status, "Failed to run command");
            return CommandResult::new(started_at, outcome, status, message);
        }
    };

    let outcome = match deadline.cause() {
        Some(Cause::Cancelled) => Outcome::Cancelled,
        _ => Outcome::Completed,
    };
    let status = finished
        .status
        .code()
        .map(StatusCode::from)
        .unwrap_or(StatusCode::Unknown);

    info!(
        command = %argv_text,
        rc = %status,
        elapsed_ms = start.elapsed().as_millis() as u64,
        bytes = finished.output.len(),
        "Command finished"
    );

    CommandResult::new(
        started_at,
        outcome,
        status,
        String::from_utf8_lossy(&finished.output).into_owned(),
    )
}

/// Spawn the resolved command and wait for it, killing its process group if
/// the deadline fires first.
async fn run(resolved: &ResolvedCommand, deadline: &Deadline) -> io::Result<Finished> {
    if let Some(cause) = deadline.cause() {
        return Err(io::Error::new(
            io::ErrorKind::Interrupted,
            match cause {
                Cause::DeadlineExceeded => "deadline exceeded before start",
                Cause::Cancelled => "operation cancelled before start",
            },
        ));
    }

    let mut cmd = Command::new(locate(resolved.program()));
    cmd.args(resolved.args())
        .env_clear()
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(PROCESS_GROUP);

    let mut child = cmd.spawn()?;
    let pgid = child.id().unwrap_or(0);
    let mut guard = GroupGuard::new(pgid);
    debug!(pid = pgid, command = %resolved.display(), "Process spawned");

    let output = Mutex::new(Vec::new());
    let stdin = child.stdin.take();
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let status = {
        let completion = async {
            let (_, _, _, status) = tokio::join!(
                feed(stdin, resolved.stdin.as_bytes()),
                drain(stdout, &output),
                drain(stderr, &output),
                child.wait(),
            );
            status
        };
        tokio::pin!(completion);

        tokio::select! {
            status = &mut completion => status,
            cause = deadline.fired() => {
                debug!(pgid, ?cause, "Deadline fired, killing process group");
                if let Err(e) = kill_process_group(pgid).await {
                    warn!(pgid, error = %e, "Failed to kill process group");
                }
                completion.await
            }
        }
    }?;
    guard.disarm();

    let output = output.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
    Ok(Finished { status, output })
}

/// Resolve a bare program name against the server's own `PATH`.
///
/// The child gets an empty environment, so the lookup has to happen here.
/// Names containing a separator are used as given, and a name that is not
/// found falls through unchanged so the spawn reports it as missing.
fn locate(program: &str) -> PathBuf {
    if program.contains('/') || program.contains(std::path::MAIN_SEPARATOR) {
        return PathBuf::from(program);
    }

    match which::which(program) {
        Ok(path) => {
            debug!(program, path = %path.display(), "Resolved program via PATH");
            path
        }
        Err(e) => {
            debug!(program, error = %e, "Program not found in PATH");
            PathBuf::from(program)
        }
    }
}

/// Write the payload and close stdin so the child sees EOF
async fn feed(stdin: Option<ChildStdin>, payload: &[u8]) {
    let Some(mut stdin) = stdin else {
        return;
    };

    if !payload.is_empty() {
        // The child may exit without reading; a broken pipe is not our concern
        if let Err(e) = stdin.write_all(payload).await {
            debug!(error = %e, "Child did not consume stdin");
        }
    }
}

/// Append everything read from `reader` to the shared buffer
async fn drain<R: AsyncRead + Unpin>(reader: Option<R>, output: &Mutex<Vec<u8>>) {
    let Some(mut reader) = reader else {
        return;
    };

    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => output
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .extend_from_slice(&chunk[..n]),
            Err(e) => {
                debug!(error = %e, "Stopped reading child output");
                break;
            }
        }
    }
}

fn classify_spawn_error(err: &io::Error, argv_text: &str) -> (Outcome, StatusCode, String) {
    match err.kind() {
        io::ErrorKind::NotFound => (
            Outcome::ProcessNotFound,
            StatusCode::NotFound,
            format!("No such file or directory: '{}'", argv_text),
        ),
        io::ErrorKind::PermissionDenied => (
            Outcome::ProcessNotExecutable,
            StatusCode::NotExecutable,
            format!("File not executable: '{}'", argv_text),
        ),
        _ => (
            Outcome::ProcessSpawnUnknown,
            StatusCode::Unknown,
            format!("Unknown error: {} Command: '{}'", err, argv_text),
        ),
    }
}

/// Render a timeout as seconds, keeping fractions only when present
fn format_seconds(timeout: Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        timeout.as_secs().to_string()
    } else {
        timeout.as_secs_f64().to_string()
    }
}
