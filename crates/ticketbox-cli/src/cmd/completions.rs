//! `tb completions`: print a shell completion script.

use clap::Args;
use clap_complete::{Shell, generate};
use std::io::Write;

/// Binary name baked into completion scripts.
pub const BIN_NAME: &str = "tb";

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` into `out`.
pub fn write_completions(shell: Shell, command: &mut clap::Command, out: &mut dyn Write) {
    generate(shell, command, BIN_NAME, out);
}

pub fn run_completions(shell: Shell, command: &mut clap::Command) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_completions(shell, command, &mut out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bash_script_mentions_binary_and_subcommands() {
        let mut command = clap::Command::new(BIN_NAME)
            .subcommand(clap::Command::new("add"))
            .subcommand(clap::Command::new("list"));
        let mut buf = Vec::new();
        write_completions(Shell::Bash, &mut command, &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("_tb"));
        assert!(script.contains("list"));
    }
}
