//! Entry point for the `actionlock` CLI. It parses arguments, loads the
//! configuration, installs logging, dispatches to the command handler, and
//! maps errors to exit codes.

use actionlock::cli::Cli;
use actionlock::config::{Config, LogFormat};
use actionlock::error::{ActionLockError, Result};
use actionlock::{commands, exit_codes, logging};
use std::process::ExitCode;

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if let Some(format) = &cli.log_format {
        config.log_format = LogFormat::from_str(format).ok_or_else(|| {
            ActionLockError::UserError(format!(
                "invalid log format '{}' (expected text or json)",
                format
            ))
        })?;
    }
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let result = load_config(&cli).and_then(|config| {
        logging::init(config.log_format, cli.verbose);
        commands::dispatch(cli.command, &config)
    });

    match result {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("Error: {}", err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
