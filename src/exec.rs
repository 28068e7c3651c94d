use std::os::unix::io::RawFd;

use nix::errno::Errno;
use nix::sys::signal::{signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{close, dup2, fork, ForkResult, Pid};

use crate::argv::{ArgumentVector, ExecArgs};
use crate::error::{Result, ShellError};

/// Outcome of one command as seen by the sequencer. Only exit code 0 counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status { Success, Failure }

impl Status {
    /// 1 for success, -1 for failure.
    pub fn code(self) -> i32 { match self { Status::Success => 1, Status::Failure => -1 } }
    pub fn is_success(self) -> bool { self == Status::Success }
    /// Process exit code for `shell24 -c`.
    pub fn exit_code(self) -> i32 { match self { Status::Success => 0, Status::Failure => 1 } }
    pub fn all(statuses: impl IntoIterator<Item = Status>) -> Status {
        if statuses.into_iter().all(Status::is_success) { Status::Success } else { Status::Failure }
    }
}

/// Descriptors a child installs before exec. `close` lists every descriptor the
/// child must drop afterwards (pipe ends, the opened redirection file).
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioRedirect<'a> {
    pub stdin: Option<RawFd>,
    pub stdout: Option<RawFd>,
    pub close: &'a [RawFd],
}

impl StdioRedirect<'_> {
    pub const INHERIT: StdioRedirect<'static> = StdioRedirect { stdin: None, stdout: None, close: &[] };
}

/// Fork one child that installs `redirect` and execs `args` through `PATH`.
/// The parent gets the child's pid back and never blocks here.
pub fn spawn(args: &ExecArgs, redirect: &StdioRedirect) -> Result<Pid> {
    // SAFETY: the interpreter is single-threaded and the child only calls
    // async-signal-safe functions (signal, dup2, close, execvp, write, _exit).
    match unsafe { fork() }.map_err(ShellError::ProcessCreation)? {
        ForkResult::Child => exec_child(args, redirect),
        ForkResult::Parent { child } => {
            tracing::debug!(pid = %child, program = ?args.program(), "spawned");
            Ok(child)
        }
    }
}

fn exec_child(args: &ExecArgs, redirect: &StdioRedirect) -> ! {
    // The Rust runtime ignores SIGPIPE and exec would keep it ignored; pipeline
    // stages must die when their reader goes away.
    if let Err(e) = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) } { child_exit(b"signal", e); }
    if let Some(fd) = redirect.stdin {
        if let Err(e) = dup2(fd, libc::STDIN_FILENO) { child_exit(b"dup2", e); }
    }
    if let Some(fd) = redirect.stdout {
        if let Err(e) = dup2(fd, libc::STDOUT_FILENO) { child_exit(b"dup2", e); }
    }
    for &fd in redirect.close {
        if fd > libc::STDERR_FILENO { let _ = close(fd); }
    }
    unsafe { libc::execvp(args.program().as_ptr(), args.argv()) };
    child_exit(args.program().to_bytes(), Errno::last())
}

// Raw writes only: the parent may hold allocator or stderr locks at fork time.
fn child_exit(what: &[u8], e: Errno) -> ! {
    let parts: [&[u8]; 4] = [what, b": ", e.desc().as_bytes(), b"\n"];
    for part in parts {
        unsafe { libc::write(libc::STDERR_FILENO, part.as_ptr().cast(), part.len()) };
    }
    unsafe { libc::_exit(1) }
}

/// Block until `pid` terminates.
pub fn wait(pid: Pid) -> Result<Status> {
    loop {
        match waitpid(pid, None) {
            Ok(status) => if let Some(s) = terminal_status(status) {
                tracing::debug!(pid = %pid, status = ?s, "reaped");
                return Ok(s);
            },
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(ShellError::Wait(e)),
        }
    }
}

/// Reap `pid` if it has already terminated.
pub fn try_wait(pid: Pid) -> Result<Option<Status>> {
    match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(status) => Ok(terminal_status(status)),
        Err(Errno::EINTR) => Ok(None),
        Err(e) => Err(ShellError::Wait(e)),
    }
}

fn terminal_status(status: WaitStatus) -> Option<Status> {
    match status {
        WaitStatus::Exited(_, 0) => Some(Status::Success),
        WaitStatus::Exited(..) | WaitStatus::Signaled(..) => Some(Status::Failure),
        _ => None,
    }
}

/// Run one command to completion with optional stdin/stdout substitution.
pub fn run(argv: &ArgumentVector, redirect: &StdioRedirect) -> Result<Status> {
    let args = argv.to_exec_args()?;
    let pid = spawn(&args, redirect)?;
    wait(pid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argv::ArgvBuilder;

    fn argv(s: &str) -> ArgumentVector { ArgvBuilder::new(5, None).build(s).unwrap() }

    #[test]
    fn status_codes() {
        assert_eq!(Status::Success.code(), 1);
        assert_eq!(Status::Failure.code(), -1);
        assert_eq!(Status::all([Status::Success, Status::Failure]), Status::Failure);
        assert_eq!(Status::all([]), Status::Success);
    }

    #[test]
    fn exit_code_maps_to_status() {
        assert_eq!(run(&argv("true"), &StdioRedirect::INHERIT).unwrap(), Status::Success);
        assert_eq!(run(&argv("false"), &StdioRedirect::INHERIT).unwrap(), Status::Failure);
    }

    #[test]
    fn unknown_program_fails_only_in_child() {
        let s = run(&argv("shell24-no-such-program-xyz"), &StdioRedirect::INHERIT).unwrap();
        assert_eq!(s, Status::Failure);
    }

    #[test]
    fn try_wait_eventually_reaps() {
        let pid = spawn(&argv("true").to_exec_args().unwrap(), &StdioRedirect::INHERIT).unwrap();
        let mut got = None;
        for _ in 0..200 {
            if let Some(s) = try_wait(pid).unwrap() { got = Some(s); break; }
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert_eq!(got, Some(Status::Success));
    }
}
