//! Completions command.

use std::io::Write;

use clap::CommandFactory;
use clap_complete::{generate, Shell as CompletionShell};

use crate::cli::{Cli, Shell};
use crate::error::Result;

impl From<Shell> for CompletionShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => CompletionShell::Bash,
            Shell::Zsh => CompletionShell::Zsh,
            Shell::Fish => CompletionShell::Fish,
            Shell::PowerShell => CompletionShell::PowerShell,
        }
    }
}

/// Print the completion script for `shell` to stdout.
pub fn execute(shell: Shell) -> Result<()> {
    render(shell, &mut std::io::stdout().lock());
    Ok(())
}

fn render(shell: Shell, out: &mut dyn Write) {
    let mut cmd = Cli::command();
    generate(CompletionShell::from(shell), &mut cmd, "rollwave", out);
}
