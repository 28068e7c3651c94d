use std::ffi::NulError;
use std::io;
use thiserror::Error;

/// Every way a single line can fail inside the engine. The read-eval loop
/// reports these and keeps prompting.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("too many arguments: {words} words (command plus at most {limit} arguments)")]
    ArgumentLimitExceeded { words: usize, limit: usize },
    #[error("too many {kind} segments: {count} (at most {limit})")]
    TooManySegments { kind: &'static str, count: usize, limit: usize },
    #[error("empty command")]
    EmptyCommand,
    #[error("empty command in {kind}")]
    EmptySegment { kind: &'static str },
    #[error("missing redirection target")]
    MissingRedirectTarget,
    #[error("line too long: {len} characters (at most {limit})")]
    LineTooLong { len: usize, limit: usize },
    #[error("fork failed: {0}")]
    ProcessCreation(#[source] nix::Error),
    #[error("pipe creation failed: {0}")]
    PipeCreation(#[source] nix::Error),
    #[error("{path}: {source}")]
    RedirectionTarget { path: String, #[source] source: io::Error },
    #[error("wait failed: {0}")]
    Wait(#[source] nix::Error),
    #[error("argument contains a NUL byte: {0}")]
    NulByte(#[from] NulError),
    #[error("HOME environment variable not set")]
    MissingHome,
}

pub type Result<T> = std::result::Result<T, ShellError>;
