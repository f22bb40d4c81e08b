//! Process group termination

use tracing::debug;

use crate::error::{ProcessError, Result};

/// Process group passed to `Command::process_group`: 0 makes the child the
/// leader of a new group whose id equals its pid.
#[cfg(unix)]
pub(crate) const PROCESS_GROUP: i32 = 0;

/// Force-kill every process in the group led by `pgid`.
///
/// - Unix: SIGKILL to the negative pid. A group that no longer exists
///   (`ESRCH`) counts as success, since the child may exit between the
///   deadline firing and the signal being sent.
/// - Windows: `taskkill /t /f /pid`, which walks the process tree.
pub async fn kill_process_group(pgid: u32) -> Result<()> {
    if pgid == 0 {
        return Err(ProcessError::KillFailed {
            pgid,
            reason: "process not initialized".to_string(),
        });
    }

    signal_group(pgid).await
}

#[cfg(unix)]
async fn signal_group(pgid: u32) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let raw = i32::try_from(pgid).map_err(|_| ProcessError::KillFailed {
        pgid,
        reason: "pid out of range".to_string(),
    })?;

    match killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        Ok(()) => {
            debug!(pgid, "Sent SIGKILL to process group");
            Ok(())
        }
        Err(Errno::ESRCH) => {
            debug!(pgid, "Process group already finished");
            Ok(())
        }
        Err(e) => Err(ProcessError::KillFailed {
            pgid,
            reason: e.to_string(),
        }),
    }
}

#[cfg(windows)]
async fn signal_group(pgid: u32) -> Result<()> {
    use std::process::Stdio;
    use tokio::process::Command;

    let status = Command::new("taskkill")
        .args(["/t", "/f", "/pid", &pgid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await?;

    // taskkill exits 128 when the process is already gone
    if !status.success() && status.code() != Some(128) {
        return Err(ProcessError::KillFailed {
            pgid,
            reason: format!("taskkill exited with {:?}", status.code()),
        });
    }

    debug!(pgid, "Windows process tree killed");
    Ok(())
}

/// Kills the process group if dropped while still armed.
///
/// Covers the execute future being dropped mid-flight (a client hanging up),
/// where `kill_on_drop` alone would only reach the direct child.
pub(crate) struct GroupGuard {
    pgid: u32,
    armed: bool,
}

impl GroupGuard {
    pub(crate) fn new(pgid: u32) -> Self {
        Self { pgid, armed: true }
    }

    /// The child has been reaped; nothing left to clean up
    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        if !self.armed || self.pgid == 0 {
            return;
        }

        #[cfg(unix)]
        {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            if let Ok(raw) = i32::try_from(self.pgid) {
                let _ = killpg(Pid::from_raw(raw), Signal::SIGKILL);
                debug!(pgid = self.pgid, "Killed process group of abandoned command");
            }
        }
    }
}
