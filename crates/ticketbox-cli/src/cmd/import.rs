//! `tb import`: replace every ticket with the contents of an export document.
//!
//! Reads `{"tickets": {...}}` from `--file` or stdin. A document that does not
//! parse leaves the current tickets untouched.

use crate::cmd::{Context, confirm};
use crate::output::{fail, render};
use anyhow::Context as _;
use clap::Args;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::PathBuf;
use ticketbox_core::command::{Command, Outcome};

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Read the document from this file instead of stdin.
    #[arg(long, short = 'f', value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Skip interactive confirmation prompt.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Serialize)]
struct ImportResult {
    imported: usize,
}

fn read_document(file: Option<&PathBuf>) -> anyhow::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut json = String::new();
            std::io::stdin()
                .read_to_string(&mut json)
                .context("Failed to read import document from stdin")?;
            Ok(json)
        }
    }
}

pub fn run_import(args: &ImportArgs, ctx: &Context) -> anyhow::Result<()> {
    // Ask before reading so a terminal user answers first, then pastes.
    let question = Command::Import {
        json: String::new(),
    }
    .confirmation();
    if let Some(question) = question
        && !args.force
        && !confirm(question)?
    {
        anyhow::bail!("import cancelled");
    }

    let json = read_document(args.file.as_ref())?;
    let mut dispatcher = ctx.dispatcher();
    let outcome = dispatcher
        .dispatch(Command::Import { json })
        .map_err(|err| fail(ctx.output, err))?;
    let Outcome::Imported { count } = outcome else {
        anyhow::bail!("unexpected outcome {outcome:?}");
    };

    let quiet = ctx.quiet;
    render(ctx.output, &ImportResult { imported: count }, |r, w| {
        if quiet {
            return Ok(());
        }
        writeln!(w, "✓ Tickets imported: {}", r.imported)
    })
}
