//! Completions command.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::error::Result;

/// Print the completion script for `shell` to stdout.
pub fn execute(shell: Shell) -> Result<()> {
    render(shell, &mut io::stdout().lock());
    Ok(())
}

fn render(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
}
