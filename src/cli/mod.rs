//! Command-line interface.

pub mod completions;
pub mod config;
pub mod context;
pub mod logout;
pub mod output;
pub mod session;
pub mod status;

use clap::{Parser, Subcommand};

use crate::error::Result;

pub use context::Context;

/// Latchkey - A terminal client for a self-hosted password manager.
#[derive(Parser)]
#[command(
    name = "latchkey",
    about = "A terminal client for a self-hosted password manager",
    version,
    after_help = "Copied secrets are wiped from the clipboard automatically."
)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server URL, overriding config.toml and LATCHKEY_SERVER
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level commands.
#[derive(Subcommand)]
pub enum Command {
    /// Check the server and report whether the vault is locked
    Status,

    /// Forget the stored session token
    Logout,

    /// Unlock the vault and open an interactive shell
    Session,

    /// Show the effective configuration
    Config {
        /// Write a default config.toml
        #[arg(long)]
        init: bool,
        /// Overwrite an existing config.toml
        #[arg(long, requires = "init")]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Execute a command.
pub fn execute(command: Command, server: Option<String>) -> Result<()> {
    use Command::*;

    match command {
        Status => runtime()?.block_on(async {
            let ctx = Context::open(server)?;
            status::execute(&ctx).await
        }),
        Logout => logout::execute(&Context::open(server)?),
        Session => runtime()?.block_on(async {
            let ctx = Context::open(server)?;
            session::execute(&ctx).await
        }),
        Config { init, force } => config::execute(init, force, server),
        Completions { shell } => completions::execute(shell),
    }
}

/// Single-threaded runtime; all work is network calls and timers.
fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
