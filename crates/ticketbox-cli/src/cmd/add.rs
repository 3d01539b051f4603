//! `tb add`: create a ticket.

use crate::cmd::Context;
use crate::cmd::show::render_ticket;
use crate::output::fail;
use clap::Args;
use ticketbox_core::command::{Command, Outcome};
use ticketbox_core::model::NewTicket;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Ticket subject (must not be empty).
    pub subject: String,

    /// Free-form ticket text.
    #[arg(long, default_value = "")]
    pub text: String,
}

pub fn run_add(args: &AddArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut dispatcher = ctx.dispatcher();
    let outcome = dispatcher
        .dispatch(Command::Create(NewTicket::new(&args.subject, &args.text)))
        .map_err(|err| fail(ctx.output, err))?;

    match outcome {
        Outcome::Created(ticket) => {
            tracing::debug!(uid = %ticket.uid, "created ticket");
            let headline = outcome_headline(&ticket.uid, "Ticket added");
            render_ticket(ctx, ticket, Some(&headline))
        }
        other => anyhow::bail!("unexpected outcome {other:?}"),
    }
}

fn outcome_headline(uid: &str, message: &str) -> String {
    format!("{message}: {uid}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: AddArgs,
    }

    #[test]
    fn text_defaults_to_empty() {
        let w = Wrapper::parse_from(["test", "Fix bug"]);
        assert_eq!(w.args.subject, "Fix bug");
        assert_eq!(w.args.text, "");
    }

    #[test]
    fn text_flag_parses() {
        let w = Wrapper::parse_from(["test", "Fix bug", "--text", "steps"]);
        assert_eq!(w.args.text, "steps");
    }

    #[test]
    fn headline_names_the_uid() {
        assert_eq!(outcome_headline("abc123", "Ticket added"), "Ticket added: abc123");
    }
}
