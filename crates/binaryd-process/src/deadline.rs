//! Per-invocation deadline derived from an upstream cancellation token

use std::sync::OnceLock;
use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

/// Why a [`Deadline`] fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cause {
    DeadlineExceeded,
    Cancelled,
}

/// A bounded sub-deadline: fires when `timeout` elapses or the parent token
/// is cancelled, whichever comes first. The first cause observed sticks.
#[derive(Debug)]
pub struct Deadline {
    at: Instant,
    token: CancellationToken,
    cause: OnceLock<Cause>,
}

impl Deadline {
    pub fn new(parent: &CancellationToken, timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
            token: parent.child_token(),
            cause: OnceLock::new(),
        }
    }

    /// Wait until the deadline fires and report why
    pub async fn fired(&self) -> Cause {
        if let Some(cause) = self.cause() {
            return cause;
        }

        let cause = tokio::select! {
            biased;
            _ = self.token.cancelled() => Cause::Cancelled,
            _ = sleep_until(self.at) => Cause::DeadlineExceeded,
        };
        *self.cause.get_or_init(|| cause)
    }

    /// The cause if the deadline has already fired
    pub fn cause(&self) -> Option<Cause> {
        if let Some(cause) = self.cause.get() {
            return Some(*cause);
        }

        if self.token.is_cancelled() {
            Some(*self.cause.get_or_init(|| Cause::Cancelled))
        } else if Instant::now() >= self.at {
            Some(*self.cause.get_or_init(|| Cause::DeadlineExceeded))
        } else {
            None
        }
    }

    pub fn is_exceeded(&self) -> bool {
        self.cause() == Some(Cause::DeadlineExceeded)
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
