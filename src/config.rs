use anyhow::{anyhow, Result};

pub const PROMPT: &str = "shell24$ ";
pub const NEW_SESSION_BUILTIN: &str = "newt";
pub const FOREGROUND_BUILTIN: &str = "fg";

/// Bounds and knobs for one interpreter instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Arguments allowed after the command name.
    pub max_args: usize,
    /// Visible characters per input line.
    pub max_line: usize,
    pub max_pipeline_stages: usize,
    pub max_conditional: usize,
    pub max_sequential: usize,
    pub max_concat_files: usize,
    pub prompt: String,
    /// Terminal emulator used by the new session builtin, run as `<terminal> -e <shell24>`.
    pub terminal: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_args: 5,
            max_line: 99,
            max_pipeline_stages: 6,
            max_conditional: 6,
            max_sequential: 5,
            max_concat_files: 6,
            prompt: PROMPT.to_string(),
            terminal: "xterm".to_string(),
        }
    }
}

/// What the binary was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode { Interactive, OneShot(String), Help }

impl Config {
    /// Defaults overlaid with `SHELL24_TERMINAL` / `SHELL24_PROMPT`.
    pub fn from_env() -> Self {
        Self::with_env(|k| std::env::var(k).ok())
    }

    fn with_env(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Config::default();
        if let Some(t) = lookup("SHELL24_TERMINAL").filter(|t| !t.is_empty()) { cfg.terminal = t; }
        if let Some(p) = lookup("SHELL24_PROMPT") { cfg.prompt = p; }
        cfg
    }

    /// Apply command-line flags on top of `self`.
    pub fn parse_args<I: IntoIterator<Item = String>>(mut self, args: I) -> Result<(Self, Mode)> {
        let mut args = args.into_iter();
        let mut mode = Mode::Interactive;
        while let Some(a) = args.next() {
            match a.as_str() {
                "-c" => { mode = Mode::OneShot(args.next().ok_or_else(|| anyhow!("missing command after -c"))?); }
                "--max-args" => {
                    let v = args.next().ok_or_else(|| anyhow!("missing value after --max-args"))?;
                    self.max_args = v.parse().map_err(|_| anyhow!("invalid --max-args value: {v}"))?;
                }
                "--terminal" => { self.terminal = args.next().ok_or_else(|| anyhow!("missing value after --terminal"))?; }
                "--prompt" => { self.prompt = args.next().ok_or_else(|| anyhow!("missing value after --prompt"))?; }
                "-h" | "--help" => { mode = Mode::Help; }
                other => { return Err(anyhow!("unknown arg: {other}")); }
            }
        }
        Ok((self, mode))
    }
}

pub const USAGE: &str = "\
usage: shell24 [-c LINE] [--max-args N] [--terminal PROG] [--prompt TEXT]

Operators (one structure per line):
    a # b # c        cat each file in turn
    a | b | c        pipeline
    cmd < f, > f, >> f
    a && b || c      conditional chain
    a ; b ; c        sequential chain
    cmd &            run in background
Builtins: newt (open a new shell in a terminal), fg (wait for last background job)
";
