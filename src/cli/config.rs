//! Config command.
//!
//! Prints the effective configuration, or writes a default `config.toml`.

use crate::cli::{context, output};
use crate::core::clipboard::SystemClipboard;
use crate::core::config::{self, Config};
use crate::error::Result;

/// Show or initialize configuration.
pub fn execute(init: bool, force: bool, server: Option<String>) -> Result<()> {
    if init {
        return write_default(force);
    }

    let config = context::effective_config(server)?;

    output::section("Configuration");
    output::kv("home", config::home_dir()?.display());
    output::kv("server.url", &config.server.url);
    output::kv("server.timeout_secs", config.server.timeout_secs);
    output::kv("clipboard.clear_after_secs", config.clipboard.clear_after_secs);

    let clipboard = match &config.clipboard.command {
        Some(command) => command.join(" "),
        None => match SystemClipboard::detect() {
            Ok(clip) => format!("auto ({})", clip.program()),
            Err(_) => "auto (none found)".to_string(),
        },
    };
    output::kv("clipboard.command", clipboard);
    Ok(())
}

fn write_default(force: bool) -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() && !force {
        output::warn(&format!("{} already exists", path.display()));
        output::hint("pass --force to overwrite");
        return Ok(());
    }

    let written = Config::default().save()?;
    output::success(&format!("wrote {}", written.display()));
    Ok(())
}
