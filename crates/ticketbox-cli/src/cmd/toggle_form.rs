//! `tb toggle-form`: flip whether the UI starts with the new-ticket form hidden.

use crate::cmd::Context;
use crate::output::{fail, render};
use serde::Serialize;
use std::io::Write;
use ticketbox_core::command::{Command, Outcome};

#[derive(Debug, Serialize)]
struct ToggleResult {
    form_hidden: bool,
}

pub fn run_toggle_form(ctx: &Context) -> anyhow::Result<()> {
    let mut dispatcher = ctx.dispatcher();
    let outcome = dispatcher
        .dispatch(Command::ToggleForm)
        .map_err(|err| fail(ctx.output, err))?;
    let Outcome::FormToggled { hidden } = outcome else {
        anyhow::bail!("unexpected outcome {outcome:?}");
    };

    render(ctx.output, &ToggleResult { form_hidden: hidden }, |r, w| {
        let state = if r.form_hidden { "hidden" } else { "shown" };
        writeln!(w, "new ticket form: {state}")
    })
}
