use std::time::Duration;

use tracing::debug;

use crate::error::QaBotError;
use crate::launch::{ExecutionBackend, TERMINAL_STATUS};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_TIMEOUT_SECS: u32 = 240;

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Blocks the calling thread for the full interval.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Fixed-interval poll budget. `max_polls` status queries are issued at most,
/// each preceded by one `interval` of sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: u32,
}

impl PollPolicy {
    pub fn with_timeout_secs(timeout_secs: u32) -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_polls: timeout_secs,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::with_timeout_secs(DEFAULT_TIMEOUT_SECS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Stopped { polls: u32 },
    /// The local wait gave up. The remote task may still be running.
    TimedOut { polls: u32 },
}

impl PollOutcome {
    pub fn reached_terminal(self) -> bool {
        matches!(self, Self::Stopped { .. })
    }
}

pub fn is_terminal(status: &str) -> bool {
    status == TERMINAL_STATUS
}

/// Waits for `run_id` to reach the terminal state.
///
/// Timing out is an outcome, not an error; only a failed status query is.
pub fn await_terminal<B: ExecutionBackend + ?Sized>(
    backend: &B,
    cluster: &str,
    run_id: &str,
    policy: PollPolicy,
    sleeper: &dyn Sleeper,
    on_poll: &mut dyn FnMut(u32, &str),
) -> Result<PollOutcome, QaBotError> {
    for poll in 1..=policy.max_polls {
        sleeper.sleep(policy.interval);
        let status = backend.task_status(cluster, run_id).map_err(QaBotError::Backend)?;
        debug!(run_id, poll, status = %status, "polled task status");
        on_poll(poll, &status);
        if is_terminal(&status) {
            return Ok(PollOutcome::Stopped { polls: poll });
        }
    }
    Ok(PollOutcome::TimedOut {
        polls: policy.max_polls,
    })
}
