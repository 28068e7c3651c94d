//! Line-oriented command interpreter: one input line becomes a pipeline, a
//! redirected command, a conditional or sequential chain, a background job,
//! or a plain command, each run as real OS processes.

pub mod argv;
pub mod chain;
pub mod classify;
pub mod concat;
pub mod config;
pub mod error;
pub mod exec;
pub mod jobs;
pub mod pipeline;
pub mod redirect;
pub mod shell;

pub use config::Config;
pub use error::ShellError;
pub use exec::Status;
pub use shell::Shell;
