//! `tb clear`: delete every ticket.

use crate::cmd::{Context, confirm};
use crate::output::{fail, render};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use ticketbox_core::command::Command;

#[derive(Args, Debug)]
pub struct ClearArgs {
    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct ClearResult {
    cleared: bool,
}

pub fn run_clear(args: &ClearArgs, ctx: &Context) -> anyhow::Result<()> {
    let command = Command::Clear;
    if let Some(question) = command.confirmation()
        && !args.force
        && !confirm(question)?
    {
        anyhow::bail!("clear cancelled");
    }

    let mut dispatcher = ctx.dispatcher();
    let outcome = dispatcher
        .dispatch(command)
        .map_err(|err| fail(ctx.output, err))?;

    let quiet = ctx.quiet;
    render(ctx.output, &ClearResult { cleared: true }, |_, w| {
        if quiet {
            return Ok(());
        }
        writeln!(w, "✓ {}", outcome.message().unwrap_or("Tickets cleared"))
    })
}
