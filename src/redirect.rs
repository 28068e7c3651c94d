use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;
use std::os::unix::fs::OpenOptionsExt;

use crate::argv::ArgvBuilder;
use crate::error::{Result, ShellError};
use crate::exec::{self, Status, StdioRedirect};

/// Permission bits for files created by `>` and `>>`, filtered by the caller's umask.
pub const CREATE_MODE: u32 = 0o777;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode { ReadOnly, WriteTruncate, WriteAppend }

impl RedirectMode {
    fn open_options(self) -> OpenOptions {
        let mut o = OpenOptions::new();
        match self {
            RedirectMode::ReadOnly => { o.read(true); }
            RedirectMode::WriteTruncate => { o.write(true).create(true).truncate(true).mode(CREATE_MODE); }
            RedirectMode::WriteAppend => { o.append(true).create(true).mode(CREATE_MODE); }
        }
        o
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectionSpec<'a> {
    pub command: &'a str,
    pub target: &'a str,
    pub mode: RedirectMode,
}

/// Pick one redirection for the whole line: `<` anywhere wins over `>`, and a
/// single `>` wins over `>>`. The command is the text before the first
/// occurrence of the chosen operator's character; the target runs from there
/// up to the next occurrence of that character.
pub fn parse(line: &str) -> Option<RedirectionSpec<'_>> {
    let (mode, op) = if line.contains('<') {
        (RedirectMode::ReadOnly, '<')
    } else if has_single_gt(line) {
        (RedirectMode::WriteTruncate, '>')
    } else if line.contains(">>") {
        (RedirectMode::WriteAppend, '>')
    } else {
        return None;
    };
    let at = line.find(op)?;
    let rest = line[at..].trim_start_matches(op);
    let target = rest.split(op).next().unwrap_or("");
    Some(RedirectionSpec { command: line[..at].trim(), target: target.trim(), mode })
}

fn has_single_gt(line: &str) -> bool {
    let b = line.as_bytes();
    let mut i = 0;
    while i < b.len() {
        if b[i] == b'>' {
            if b.get(i + 1) == Some(&b'>') { i += 2; continue; }
            return true;
        }
        i += 1;
    }
    false
}

pub fn open_target(path: &str, mode: RedirectMode) -> Result<File> {
    mode.open_options().open(path).map_err(|source| ShellError::RedirectionTarget { path: path.to_string(), source })
}

/// Run `cmd < f`, `cmd > f` or `cmd >> f`. The command is validated before the
/// file is opened; the file is closed in the parent once the child is reaped.
pub fn run(line: &str, builder: &ArgvBuilder) -> Result<Status> {
    let spec = parse(line).ok_or(ShellError::MissingRedirectTarget)?;
    let args = builder.build(spec.command)?.to_exec_args()?;
    if spec.target.is_empty() { return Err(ShellError::MissingRedirectTarget); }
    let target = builder.expand(spec.target);

    let file = open_target(&target, spec.mode)?;
    let fd = file.as_raw_fd();
    let close = [fd];
    tracing::debug!(path = %target, mode = ?spec.mode, "redirection");
    let redirect = match spec.mode {
        RedirectMode::ReadOnly => StdioRedirect { stdin: Some(fd), stdout: None, close: &close },
        RedirectMode::WriteTruncate | RedirectMode::WriteAppend => StdioRedirect { stdin: None, stdout: Some(fd), close: &close },
    };
    let pid = exec::spawn(&args, &redirect)?;
    let status = exec::wait(pid);
    drop(file);
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_each_operator() {
        assert_eq!(parse("sort < in.txt"), Some(RedirectionSpec { command: "sort", target: "in.txt", mode: RedirectMode::ReadOnly }));
        assert_eq!(parse("ls -l >out"), Some(RedirectionSpec { command: "ls -l", target: "out", mode: RedirectMode::WriteTruncate }));
        assert_eq!(parse("echo hi >>  log "), Some(RedirectionSpec { command: "echo hi", target: "log", mode: RedirectMode::WriteAppend }));
        assert_eq!(parse("echo hi"), None);
    }

    #[test]
    fn input_beats_output_wherever_it_appears() {
        let spec = parse("cat < a > b").unwrap();
        assert_eq!((spec.mode, spec.command, spec.target), (RedirectMode::ReadOnly, "cat", "a > b"));
        let spec = parse("sort > out < in").unwrap();
        assert_eq!((spec.mode, spec.command, spec.target), (RedirectMode::ReadOnly, "sort > out", "in"));
    }

    #[test]
    fn single_gt_beats_append() {
        let spec = parse("echo x >> a > b").unwrap();
        assert_eq!((spec.mode, spec.command, spec.target), (RedirectMode::WriteTruncate, "echo x", "a"));
        let spec = parse("echo x >> a >> b").unwrap();
        assert_eq!((spec.mode, spec.target), (RedirectMode::WriteAppend, "a"));
    }

    #[test]
    fn empty_target_is_rejected() {
        let b = ArgvBuilder::new(5, None);
        assert!(matches!(run("echo hi >", &b), Err(ShellError::MissingRedirectTarget)));
    }

    #[test]
    fn missing_input_file_is_recoverable() {
        let b = ArgvBuilder::new(5, None);
        match run("cat < /nonexistent/shell24/input", &b) {
            Err(ShellError::RedirectionTarget { path, .. }) => assert_eq!(path, "/nonexistent/shell24/input"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn truncate_then_append() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("out.txt");
        std::fs::write(&p, "old content that is long\n").unwrap();
        let b = ArgvBuilder::new(5, None);
        let path = p.to_str().unwrap();
        assert_eq!(run(&format!("echo new > {path}"), &b).unwrap(), Status::Success);
        assert_eq!(std::fs::read_to_string(&p).unwrap(), "new\n");
        assert_eq!(run(&format!("echo more >> {path}"), &b).unwrap(), Status::Success);
        assert_eq!(std::fs::read_to_string(&p).unwrap(), "new\nmore\n");
    }
}
