//! completion command - Generate shell completion scripts

use crate::cli::args::{Cli, Shell};
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{generate, shells};

impl From<Shell> for shells::Shell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => shells::Shell::Bash,
            Shell::Zsh => shells::Shell::Zsh,
            Shell::Fish => shells::Shell::Fish,
            Shell::PowerShell => shells::Shell::PowerShell,
        }
    }
}

/// Write the completion script for `shell` to stdout.
pub fn completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(
        shells::Shell::from(shell),
        &mut cmd,
        name,
        &mut std::io::stdout(),
    );
    Ok(())
}
