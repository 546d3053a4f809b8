//! myflix - a terminal client for the movie catalog API.
//!
//! Architecture:
//! - `api::ApiClient` is the only component that talks to the server
//! - The token and cached user live in a session file (`session` module)
//! - User changes are broadcast through `notify::UserNotifier`
//! - CLI subcommands play the part of the app's screens

mod cli;

use anyhow::Result;
use clap::Parser;

use cli::{execute, resolve_config, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    myflix::logging::init_logging(&config.log_level, cli.verbose);

    execute(cli, config).await
}
