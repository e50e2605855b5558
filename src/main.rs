//! Latchkey - A terminal client for a self-hosted password manager.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use latchkey::cli::output;
use latchkey::cli::{execute, Cli};
use latchkey::core::constants::LOG_ENV;
use latchkey::error::{ClipboardError, ConfigError, Error};

fn main() {
    let cli = Cli::parse();
    output::init();

    // Initialize tracing subscriber with env-filter support
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("latchkey=debug")
        } else {
            EnvFilter::new("latchkey=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = execute(cli.command, cli.server) {
        let suggestion = match &e {
            Error::Connectivity(_) => Some("check the server is running, or pass --server URL"),
            Error::Config(ConfigError::Parse(_) | ConfigError::InvalidValue { .. }) => {
                Some("fix config.toml, or run: latchkey config --init --force")
            }
            Error::Clipboard(ClipboardError::Unavailable(_)) => {
                Some("set clipboard.command in config.toml")
            }
            Error::AuthExpired => Some("run: latchkey session"),
            _ => None,
        };

        output::error(&e.to_string());
        if let Some(hint) = suggestion {
            output::hint(hint);
        }
        std::process::exit(1);
    }
}
