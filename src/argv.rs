use std::ffi::{CStr, CString};
use std::ptr;

use crate::error::{Result, ShellError};

/// Command name followed by its positional arguments, already tilde-expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentVector { words: Vec<String> }

impl ArgumentVector {
    /// Wrap words that are not subject to the argument cap or tilde expansion.
    pub fn with_program(program: String, args: impl IntoIterator<Item = String>) -> Self {
        ArgumentVector { words: std::iter::once(program).chain(args).collect() }
    }
    pub fn program(&self) -> &str { &self.words[0] }
    pub fn words(&self) -> &[String] { &self.words }
    pub fn len(&self) -> usize { self.words.len() }
    pub fn is_empty(&self) -> bool { self.words.is_empty() }

    /// C strings and the null-terminated pointer array for `execvp`, both built
    /// in the parent so the child only has to exec.
    pub fn to_exec_args(&self) -> Result<ExecArgs> {
        let args = self.words.iter().map(|w| CString::new(w.as_str())).collect::<std::result::Result<Vec<_>, _>>()?;
        // pointers stay valid when `args` moves: they point into each CString's heap buffer
        let argv = args.iter().map(|a| a.as_ptr()).chain(std::iter::once(ptr::null())).collect();
        Ok(ExecArgs { args, argv })
    }
}

#[derive(Debug)]
pub struct ExecArgs {
    args: Vec<CString>,
    argv: Vec<*const libc::c_char>,
}

impl ExecArgs {
    pub fn program(&self) -> &CStr { &self.args[0] }
    pub fn args(&self) -> &[CString] { &self.args }
    /// `argv` for `execvp(3)`, ending in a null pointer.
    pub fn argv(&self) -> *const *const libc::c_char { self.argv.as_ptr() }
}

/// Builds argument vectors for one line under a fixed argument cap.
#[derive(Debug, Clone)]
pub struct ArgvBuilder {
    max_args: usize,
    home: Option<String>,
}

impl ArgvBuilder {
    pub fn new(max_args: usize, home: Option<String>) -> Self { ArgvBuilder { max_args, home } }

    /// Reads `HOME` from the environment.
    pub fn from_env(max_args: usize) -> Self { Self::new(max_args, std::env::var("HOME").ok()) }

    /// Split `segment` on whitespace and expand `~`. More than `max_args`
    /// arguments after the command name rejects the whole segment.
    pub fn build(&self, segment: &str) -> Result<ArgumentVector> {
        let words: Vec<&str> = segment.split_whitespace().collect();
        if words.is_empty() { return Err(ShellError::EmptyCommand); }
        if words.len() > self.max_args + 1 {
            return Err(ShellError::ArgumentLimitExceeded { words: words.len(), limit: self.max_args });
        }
        let words = words.into_iter().map(|w| self.expand(w)).collect();
        Ok(ArgumentVector { words })
    }

    /// Tilde-expand one word; with `HOME` unset the error is reported and the word kept.
    pub fn expand(&self, word: &str) -> String {
        expand_tilde(word, self.home.as_deref()).unwrap_or_else(|e| {
            eprintln!("Error: {e}");
            tracing::warn!(word, "tilde left unexpanded");
            word.to_string()
        })
    }
}

/// `~` becomes `home`, `~/rest` becomes `home/rest`; every other word is returned as is.
pub fn expand_tilde(word: &str, home: Option<&str>) -> Result<String> {
    let rest = match word.strip_prefix('~') {
        Some("") => None,
        Some(r) => match r.strip_prefix('/') { Some(r) => Some(r), None => return Ok(word.to_string()) },
        None => return Ok(word.to_string()),
    };
    let home = home.ok_or(ShellError::MissingHome)?;
    Ok(match rest { None => home.to_string(), Some(rest) => format!("{home}/{rest}") })
}
