use std::io::{self, BufRead, Read, Write};

use anyhow::Result;

use crate::argv::{ArgumentVector, ArgvBuilder};
use crate::classify::{classify, LineKind};
use crate::config::Config;
use crate::error::{self, ShellError};
use crate::exec::{self, Status, StdioRedirect};
use crate::jobs::{JobTable, Tracking};
use crate::{chain, concat, pipeline, redirect};

/// Interpreter state that lives across lines.
#[derive(Debug)]
pub struct Shell {
    config: Config,
    jobs: JobTable,
}

impl Shell {
    pub fn new(config: Config) -> Self { Shell { config, jobs: JobTable::new() } }
    pub fn jobs(&self) -> &JobTable { &self.jobs }

    /// Classify one line and run it as exactly one structure.
    pub fn eval(&mut self, line: &str) -> error::Result<Status> {
        let len = line.chars().count();
        if len > self.config.max_line { return Err(ShellError::LineTooLong { len, limit: self.config.max_line }); }
        let kind = classify(line);
        tracing::debug!(?kind, line, "classified");
        // HOME is read per line so a changed environment is picked up.
        let builder = ArgvBuilder::from_env(self.config.max_args);
        match kind {
            LineKind::Empty => Ok(Status::Success),
            LineKind::NewSession => self.new_session(),
            LineKind::Foreground => match self.jobs.foreground()? {
                Some((_, status)) => Ok(status),
                None => {
                    println!("No background processes to bring to foreground");
                    Ok(Status::Failure)
                }
            },
            LineKind::Concatenation => concat::run(line, &builder, self.config.max_concat_files),
            LineKind::Pipeline => pipeline::run(line, &builder, self.config.max_pipeline_stages),
            LineKind::Redirection => redirect::run(line, &builder),
            LineKind::Conditional => chain::run_conditional(line, &builder, self.config.max_conditional),
            LineKind::Sequential => chain::run_sequential(line, &builder, self.config.max_sequential),
            LineKind::Background => {
                let command = line.trim_end().strip_suffix('&').unwrap_or(line);
                let argv = builder.build(command)?;
                self.jobs.launch(&argv, Tracking::Tracked)?;
                Ok(Status::Success)
            }
            LineKind::Plain => exec::run(&builder.build(line)?, &StdioRedirect::INHERIT),
        }
    }

    // `<terminal> -e <this binary>`, never entered in the job table.
    fn new_session(&mut self) -> error::Result<Status> {
        let me = std::env::current_exe().map(|p| p.to_string_lossy().into_owned()).unwrap_or_else(|_| "shell24".to_string());
        let argv = ArgumentVector::with_program(self.config.terminal.clone(), ["-e".to_string(), me]);
        self.jobs.launch(&argv, Tracking::Untracked)?;
        Ok(Status::Success)
    }

    /// Prompt, read, eval until end of input. Engine errors are reported and the loop goes on.
    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
        // worst case UTF-8 for `max_line` characters plus the newline
        let limit = self.config.max_line.saturating_mul(4) as u64 + 1;
        let mut buf = Vec::new();
        loop {
            self.jobs.reap_detached();
            out.write_all(self.config.prompt.as_bytes())?;
            out.flush()?;
            buf.clear();
            if (&mut input).take(limit).read_until(b'\n', &mut buf)? == 0 { break; }
            if buf.last() == Some(&b'\n') {
                buf.pop();
            } else if buf.len() as u64 == limit {
                // cut off mid-line: drop the rest, eval still rejects what was kept
                discard_line(&mut input)?;
            }
            let line = String::from_utf8_lossy(&buf);
            if let Err(e) = self.eval(&line) {
                tracing::warn!(error = %e, "line failed");
                eprintln!("Error: {e}");
            }
        }
        Ok(())
    }
}

fn discard_line<R: BufRead>(input: &mut R) -> io::Result<()> {
    loop {
        let chunk = input.fill_buf()?;
        if chunk.is_empty() { return Ok(()); }
        match chunk.iter().position(|&b| b == b'\n') {
            Some(i) => { input.consume(i + 1); return Ok(()); }
            None => { let n = chunk.len(); input.consume(n); }
        }
    }
}
