//! `tb edit`: change the mutable fields of a ticket.
//!
//! # Supported fields
//! - `--subject`                   : new subject (must not be empty)
//! - `--text`                      : new text (pass an empty string to clear)
//! - `--state`                     : new|in_progress|done|canceled (or n|p|d|c)
//! - `--priority` / `--no-priority`: set or clear the priority marker
//!
//! Every save bumps `modified`, even if no field changed.

use crate::cmd::show::render_ticket;
use crate::cmd::{Context, require_ticket};
use crate::output::{CliError, fail, render_error};
use clap::Args;
use ticketbox_core::command::{Command, Outcome};
use ticketbox_core::error::ErrorCode;
use ticketbox_core::model::{State, TicketEdit};

#[derive(Args, Debug)]
pub struct EditArgs {
    /// Ticket id to edit.
    pub uid: String,

    /// New subject.
    #[arg(long)]
    pub subject: Option<String>,

    /// New text (pass empty string to clear).
    #[arg(long)]
    pub text: Option<String>,

    /// New state: new, in_progress, done, canceled.
    #[arg(long)]
    pub state: Option<String>,

    /// Mark the ticket as a priority.
    #[arg(long, conflicts_with = "no_priority")]
    pub priority: bool,

    /// Clear the priority marker.
    #[arg(long)]
    pub no_priority: bool,
}

impl EditArgs {
    fn priority_change(&self) -> Option<bool> {
        if self.priority {
            Some(true)
        } else if self.no_priority {
            Some(false)
        } else {
            None
        }
    }

    /// Overlay the requested changes on `edit`.
    fn apply(&self, mut edit: TicketEdit, state: Option<State>) -> TicketEdit {
        if let Some(subject) = &self.subject {
            edit.subject.clone_from(subject);
        }
        if let Some(text) = &self.text {
            edit.text.clone_from(text);
        }
        if let Some(state) = state {
            edit.state = state;
        }
        if let Some(priority) = self.priority_change() {
            edit.priority = priority;
        }
        edit
    }
}

pub fn run_edit(args: &EditArgs, ctx: &Context) -> anyhow::Result<()> {
    let state = match args.state.as_deref().map(str::parse::<State>).transpose() {
        Ok(state) => state,
        Err(err) => {
            let code = ErrorCode::InvalidEnumValue;
            render_error(
                ctx.output,
                &CliError::with_details(
                    err.to_string(),
                    code.hint().unwrap_or_default(),
                    code.code(),
                ),
            )?;
            anyhow::bail!("{err}");
        }
    };

    let mut dispatcher = ctx.dispatcher();
    let ticket = require_ticket(ctx, &dispatcher, &args.uid)?;
    let edit = args.apply(TicketEdit::from_ticket(&ticket), state);

    let outcome = dispatcher
        .dispatch(Command::Update { ticket, edit })
        .map_err(|err| fail(ctx.output, err))?;

    match outcome {
        Outcome::Updated(stored) => {
            let headline = format!("Ticket updated: {}", stored.uid);
            render_ticket(ctx, stored, Some(&headline))
        }
        other => anyhow::bail!("unexpected outcome {other:?}"),
    }
}
