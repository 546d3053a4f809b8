//! Command-line interface: argument parsing and command execution.

mod args;
mod commands;

pub use args::Cli;
pub use commands::{execute, resolve_config};
