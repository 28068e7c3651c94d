use anyhow::Result;
use std::env;
use std::io;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use shell24::config::{Config, Mode, USAGE};
use shell24::Shell;

fn main() -> Result<()> {
    // RUST_LOG=shell24=debug shows classification, spawn and reap events on stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let (config, mode) = Config::from_env().parse_args(env::args().skip(1))?;
    let mut shell = Shell::new(config);
    match mode {
        Mode::Help => { print!("{USAGE}"); Ok(()) }
        Mode::OneShot(line) => {
            let code = match shell.eval(&line) {
                Ok(status) => status.exit_code(),
                Err(e) => { eprintln!("Error: {e}"); 2 }
            };
            std::process::exit(code);
        }
        Mode::Interactive => shell.run(io::stdin().lock(), io::stdout()),
    }
}
