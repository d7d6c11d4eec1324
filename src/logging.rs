//! Log subscriber setup for the actionlock CLI.

use crate::config::LogFormat;
use tracing_subscriber::EnvFilter;

/// Build the event filter: `RUST_LOG` when set, otherwise a default that is
/// more talkative about lock handling when `verbose` is on.
pub fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("info,actionlock=debug")
        } else {
            EnvFilter::new("warn,actionlock=info")
        }
    })
}

/// Install the global subscriber writing to stderr.
///
/// Calling this twice keeps the first subscriber.
pub fn init(format: LogFormat, verbose: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false);

    // Fails only when a subscriber is already installed.
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
