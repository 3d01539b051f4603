//! `tb show`: display full details of a single ticket.

use crate::cmd::{Context, require_ticket};
use crate::output::{pretty_kv, pretty_rule, pretty_section, render_mode};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use ticketbox_core::model::Ticket;
use ticketbox_core::view::format_timestamp;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Ticket id (6 lowercase base-36 characters).
    pub uid: String,
}

/// Full ticket detail as returned in JSON output.
#[derive(Debug, Serialize)]
pub struct ShowTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub state_label: &'static str,
    #[serde(skip)]
    pub created_text: String,
    #[serde(skip)]
    pub modified_text: String,
}

impl ShowTicket {
    pub fn new(ticket: Ticket, date_format: &str) -> Self {
        Self {
            state_label: ticket.state.label(),
            created_text: format_timestamp(ticket.created, date_format),
            modified_text: format_timestamp(ticket.modified, date_format),
            ticket,
        }
    }
}

pub fn run_show(args: &ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let dispatcher = ctx.dispatcher();
    let ticket = require_ticket(ctx, &dispatcher, &args.uid)?;
    render_ticket(ctx, ticket, None)
}

/// Render one ticket in the context's output mode, with an optional
/// confirmation line above it in human modes.
pub fn render_ticket(ctx: &Context, ticket: Ticket, headline: Option<&str>) -> anyhow::Result<()> {
    let show = ShowTicket::new(ticket, &ctx.config.ui.date_format);
    let quiet = ctx.quiet;
    render_mode(
        ctx.output,
        &show,
        |t, w| {
            if let Some(line) = headline.filter(|_| !quiet) {
                writeln!(w, "{line}")?;
            }
            render_show_text(t, w)
        },
        |t, w| {
            if let Some(line) = headline.filter(|_| !quiet) {
                writeln!(w, "✓ {line}")?;
            }
            render_show_human(t, w)
        },
    )
}

fn render_show_human(item: &ShowTicket, w: &mut dyn Write) -> std::io::Result<()> {
    let ticket = &item.ticket;
    pretty_section(w, &format!("Ticket {}", ticket.uid))?;
    writeln!(w, "{}", ticket.subject)?;
    pretty_rule(w)?;
    pretty_kv(w, "state", item.state_label)?;
    pretty_kv(w, "priority", if ticket.priority { "yes" } else { "no" })?;
    pretty_kv(w, "created", &item.created_text)?;
    pretty_kv(w, "modified", &item.modified_text)?;

    if !ticket.text.is_empty() {
        writeln!(w)?;
        pretty_section(w, "Text")?;
        for line in ticket.text.lines() {
            writeln!(w, "{line}")?;
        }
    }
    Ok(())
}

fn render_show_text(item: &ShowTicket, w: &mut dyn Write) -> std::io::Result<()> {
    let ticket = &item.ticket;
    writeln!(w, "uid:       {}", ticket.uid)?;
    writeln!(w, "subject:   {}", ticket.subject)?;
    writeln!(w, "state:     {}", item.state_label)?;
    writeln!(w, "priority:  {}", ticket.priority)?;
    writeln!(w, "created:   {}", item.created_text)?;
    writeln!(w, "modified:  {}", item.modified_text)?;
    if !ticket.text.is_empty() {
        writeln!(w)?;
        for line in ticket.text.lines() {
            writeln!(w, "{line}")?;
        }
    }
    Ok(())
}
