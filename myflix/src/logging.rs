//! Tracing setup for the CLI.

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so command output on
/// stdout stays clean.
///
/// `RUST_LOG` wins when set; otherwise `default_level` is used, raised to
/// `debug` for this crate when `verbose` is on.
pub fn init_logging(default_level: &str, verbose: bool) {
    let fallback = if verbose {
        format!("{default_level},myflix=debug")
    } else {
        default_level.to_string()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
    if installed.is_err() {
        debug!("Tracing subscriber already installed");
    }
}
