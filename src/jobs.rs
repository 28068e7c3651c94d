use nix::unistd::Pid;

use crate::argv::ArgumentVector;
use crate::error::Result;
use crate::exec::{self, Status, StdioRedirect};

/// A background process started by `cmd &`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub pid: Pid,
    /// Launch order, starting at 1.
    pub seq: u64,
}

/// Whether a background launch is recorded for `fg`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tracking {
    Tracked,
    /// Fire and forget, e.g. a new terminal session. Reaped quietly, never foregrounded.
    Untracked,
}

/// Background jobs owned by one interpreter loop. `fg` always takes the most recent job.
#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
    detached: Vec<Pid>,
    launched: u64,
}

impl JobTable {
    pub fn new() -> Self { Self::default() }
    pub fn len(&self) -> usize { self.jobs.len() }
    pub fn is_empty(&self) -> bool { self.jobs.is_empty() }
    pub fn detached(&self) -> usize { self.detached.len() }

    /// Fork `argv` without waiting for it.
    pub fn launch(&mut self, argv: &ArgumentVector, tracking: Tracking) -> Result<Pid> {
        let args = argv.to_exec_args()?;
        let pid = exec::spawn(&args, &StdioRedirect::INHERIT)?;
        match tracking {
            Tracking::Tracked => {
                self.launched += 1;
                self.jobs.push(Job { pid, seq: self.launched });
                tracing::debug!(pid = %pid, seq = self.launched, "background job");
            }
            Tracking::Untracked => self.detached.push(pid),
        }
        Ok(pid)
    }

    /// Pop the most recent job and block until it terminates. `None` when the table is empty.
    pub fn foreground(&mut self) -> Result<Option<(Job, Status)>> {
        let Some(job) = self.jobs.pop() else { return Ok(None) };
        tracing::debug!(pid = %job.pid, seq = job.seq, "foreground");
        let status = exec::wait(job.pid)?;
        Ok(Some((job, status)))
    }

    /// Reap untracked processes that have already exited so they do not linger as zombies.
    pub fn reap_detached(&mut self) {
        self.detached.retain(|&pid| match exec::try_wait(pid) {
            Ok(Some(_)) => false,
            Ok(None) => true,
            Err(e) => {
                tracing::warn!(pid = %pid, error = %e, "dropping detached process");
                false
            }
        });
    }
}
