use crate::argv::ArgvBuilder;
use crate::error::{Result, ShellError};
use crate::exec::{self, Status, StdioRedirect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joiner { And, Or }

/// Commands of an `&&`/`||` chain; `operators[i]` sits between `commands[i]` and `commands[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalChain<'a> {
    pub commands: Vec<&'a str>,
    pub operators: Vec<Joiner>,
}

/// Split on doubled `&&` / `||` only, recording each join in one pass. A lone
/// `&` or `|` stays inside its command text.
pub fn split_conditional(line: &str) -> ConditionalChain<'_> {
    let bytes = line.as_bytes();
    let (mut commands, mut operators) = (Vec::new(), Vec::new());
    let (mut start, mut i) = (0, 0);
    while i + 1 < bytes.len() {
        let op = match (bytes[i], bytes[i + 1]) {
            (b'&', b'&') => Some(Joiner::And),
            (b'|', b'|') => Some(Joiner::Or),
            _ => None,
        };
        if let Some(op) = op {
            commands.push(line[start..i].trim());
            operators.push(op);
            i += 2;
            start = i;
        } else {
            i += 1;
        }
    }
    commands.push(line[start..].trim());
    ConditionalChain { commands, operators }
}

/// Whether the chain stops after a command that produced `status` and is followed by `op`.
pub fn short_circuits(op: Joiner, status: Status) -> bool {
    matches!((op, status), (Joiner::And, Status::Failure) | (Joiner::Or, Status::Success))
}

/// Left-to-right short circuit: after each command, the operator that follows
/// it decides, from that command's own status, whether the chain goes on.
/// Returns the status of the last command that ran.
pub fn run_conditional(line: &str, builder: &ArgvBuilder, max_commands: usize) -> Result<Status> {
    let chain = split_conditional(line);
    if chain.commands.iter().any(|c| c.is_empty()) { return Err(ShellError::EmptySegment { kind: "conditional chain" }); }
    if chain.commands.len() > max_commands {
        return Err(ShellError::TooManySegments { kind: "conditional chain", count: chain.commands.len(), limit: max_commands });
    }
    let mut status = Status::Failure;
    for (i, command) in chain.commands.iter().enumerate() {
        status = run_segment(command, builder)?;
        tracing::debug!(segment = i, status = status.code(), "conditional step");
        if let Some(&op) = chain.operators.get(i) {
            if short_circuits(op, status) { break; }
        }
    }
    Ok(status)
}

/// Segment texts between `;`, trimmed; empty ones (e.g. a trailing `;`) are dropped.
pub fn split_sequential(line: &str) -> Vec<&str> {
    line.split(';').map(str::trim).filter(|s| !s.is_empty()).collect()
}

/// Run every segment in order regardless of earlier failures.
pub fn run_sequential(line: &str, builder: &ArgvBuilder, max_commands: usize) -> Result<Status> {
    let segments = split_sequential(line);
    if segments.len() > max_commands {
        return Err(ShellError::TooManySegments { kind: "sequential chain", count: segments.len(), limit: max_commands });
    }
    let mut status = Status::Success;
    for segment in segments {
        status = run_segment(segment, builder)?;
    }
    Ok(status)
}

// A segment that cannot be built is reported and counts as a failure; the chain goes on.
fn run_segment(segment: &str, builder: &ArgvBuilder) -> Result<Status> {
    match builder.build(segment) {
        Ok(argv) => exec::run(&argv, &StdioRedirect::INHERIT),
        Err(e) => {
            eprintln!("Error: {e}");
            Ok(Status::Failure)
        }
    }
}
