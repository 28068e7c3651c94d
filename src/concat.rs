use crate::argv::ArgvBuilder;
use crate::error::{Result, ShellError};
use crate::exec::{self, Status, StdioRedirect};

/// File names between `#` separators.
pub fn split_files(line: &str) -> Vec<&str> {
    line.split(|c: char| c == '#' || c.is_whitespace()).filter(|s| !s.is_empty()).collect()
}

/// `a # b # c`: print each file with `cat`, one after the other. Fails if any `cat` failed.
pub fn run(line: &str, builder: &ArgvBuilder, max_files: usize) -> Result<Status> {
    let files = split_files(line);
    if files.is_empty() { return Err(ShellError::EmptySegment { kind: "file list" }); }
    if files.len() > max_files {
        return Err(ShellError::TooManySegments { kind: "file list", count: files.len(), limit: max_files });
    }
    let commands = files.iter().map(|f| builder.build(&format!("cat {f}"))).collect::<Result<Vec<_>>>()?;
    let mut statuses = Vec::with_capacity(commands.len());
    for argv in &commands {
        statuses.push(exec::run(argv, &StdioRedirect::INHERIT)?);
    }
    Ok(Status::all(statuses))
}
