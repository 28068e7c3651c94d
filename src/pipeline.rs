use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use nix::fcntl::OFlag;
use nix::unistd::pipe2;

use crate::argv::{ArgvBuilder, ExecArgs};
use crate::error::{Result, ShellError};
use crate::exec::{self, Status, StdioRedirect};

/// Stage texts between `|`, trimmed; empty stages are dropped.
pub fn split_stages(line: &str) -> Vec<&str> {
    line.split('|').map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Run `a | b | c`. Every stage is validated before the first pipe exists, all
/// pipes exist before the first fork, and the parent closes every pipe end
/// before it starts reaping. The result is the last stage's status.
pub fn run(line: &str, builder: &ArgvBuilder, max_stages: usize) -> Result<Status> {
    let segments = split_stages(line);
    if segments.is_empty() { return Err(ShellError::EmptySegment { kind: "pipeline" }); }
    if segments.len() > max_stages {
        return Err(ShellError::TooManySegments { kind: "pipeline", count: segments.len(), limit: max_stages });
    }
    let stages = segments.iter().map(|s| builder.build(s)?.to_exec_args()).collect::<Result<Vec<ExecArgs>>>()?;

    let pipes = (1..stages.len()).map(|_| pipe2(OFlag::O_CLOEXEC).map_err(ShellError::PipeCreation)).collect::<Result<Vec<(OwnedFd, OwnedFd)>>>()?;
    let all_fds: Vec<RawFd> = pipes.iter().flat_map(|(r, w)| [r.as_raw_fd(), w.as_raw_fd()]).collect();
    tracing::debug!(stages = stages.len(), pipes = pipes.len(), "pipeline");

    let last = stages.len() - 1;
    let mut pids = Vec::with_capacity(stages.len());
    let mut spawn_err = None;
    for (i, args) in stages.iter().enumerate() {
        let redirect = StdioRedirect {
            stdin: (i > 0).then(|| pipes[i - 1].0.as_raw_fd()),
            stdout: (i < last).then(|| pipes[i].1.as_raw_fd()),
            close: &all_fds,
        };
        match exec::spawn(args, &redirect) {
            Ok(pid) => pids.push(pid),
            Err(e) => { spawn_err = Some(e); break; }
        }
    }
    drop(pipes);

    // Reap whatever was started even when a later fork failed.
    let mut status = Status::Failure;
    let mut wait_err = None;
    for pid in pids {
        match exec::wait(pid) {
            Ok(s) => status = s,
            Err(e) => { wait_err.get_or_insert(e); }
        }
    }
    if let Some(e) = spawn_err.or(wait_err) { return Err(e); }
    Ok(status)
}
