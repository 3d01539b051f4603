//! `tb delete`: remove a ticket after confirmation.

use crate::cmd::{Context, confirm, require_ticket};
use crate::output::{fail, render};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use ticketbox_core::command::{Command, Outcome};

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Ticket id to delete.
    pub uid: String,

    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct DeleteResult {
    uid: String,
    ok: bool,
}

pub fn run_delete(args: &DeleteArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut dispatcher = ctx.dispatcher();
    let ticket = require_ticket(ctx, &dispatcher, &args.uid)?;

    let command = Command::Delete {
        uid: ticket.uid.clone(),
    };
    if let Some(question) = command.confirmation()
        && !args.force
        && !confirm(&format!("Delete {} '{}'? {question}", ticket.uid, ticket.subject))?
    {
        anyhow::bail!("deletion of '{}' cancelled", ticket.uid);
    }

    let outcome = dispatcher
        .dispatch(command)
        .map_err(|err| fail(ctx.output, err))?;
    let Outcome::Deleted { uid, .. } = outcome else {
        anyhow::bail!("unexpected outcome {outcome:?}");
    };

    let quiet = ctx.quiet;
    render(ctx.output, &DeleteResult { uid, ok: true }, |r, w| {
        if quiet {
            return Ok(());
        }
        writeln!(w, "✓ Ticket removed: {}", r.uid)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: DeleteArgs,
    }

    #[test]
    fn force_defaults_off() {
        let w = Wrapper::parse_from(["test", "abc123"]);
        assert_eq!(w.args.uid, "abc123");
        assert!(!w.args.force);
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let cmd = Command::Delete {
            uid: "abc123".into(),
        };
        assert!(cmd.confirmation().is_some());
    }
}
