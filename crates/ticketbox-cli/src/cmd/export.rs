//! `tb export`: write every ticket as an import-ready JSON document.

use crate::cmd::Context;
use crate::output::{fail, render};
use anyhow::Context as _;
use clap::Args;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use ticketbox_core::command::{Command, ExportDocument, Outcome};

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Write the document to this file instead of stdout.
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Indent the JSON document.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Serialize)]
struct ExportResult {
    exported: usize,
    path: PathBuf,
}

fn encode(json: String, pretty: bool) -> anyhow::Result<String> {
    if !pretty {
        return Ok(json);
    }
    Ok(ExportDocument::parse(&json)?.to_json_pretty()?)
}

pub fn run_export(args: &ExportArgs, ctx: &Context) -> anyhow::Result<()> {
    let mut dispatcher = ctx.dispatcher();
    let outcome = dispatcher
        .dispatch(Command::Export)
        .map_err(|err| fail(ctx.output, err))?;
    let Outcome::Exported { json, count } = outcome else {
        anyhow::bail!("unexpected outcome {outcome:?}");
    };
    let document = encode(json, args.pretty)?;

    let Some(path) = &args.output else {
        // The document itself is the output, whatever the mode.
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{document}")?;
        return Ok(());
    };

    std::fs::write(path, format!("{document}\n"))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let quiet = ctx.quiet;
    let result = ExportResult {
        exported: count,
        path: path.clone(),
    };
    render(ctx.output, &result, |r, w| {
        if quiet {
            return Ok(());
        }
        writeln!(w, "✓ Tickets exported: {} to {}", r.exported, r.path.display())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_document_is_passed_through() {
        let json = r#"{"tickets":{}}"#.to_string();
        assert_eq!(encode(json.clone(), false).unwrap(), json);
    }

    #[test]
    fn pretty_document_is_indented_and_equivalent() {
        let json = r#"{"tickets":{"abc123":{"uid":"abc123","subject":"s","text":"","created":1,"modified":2,"state":"d","priority":true}}}"#;
        let pretty = encode(json.to_string(), true).unwrap();
        assert!(pretty.contains("\n  \"tickets\""));
        assert_eq!(
            ExportDocument::parse(&pretty).unwrap(),
            ExportDocument::parse(json).unwrap()
        );
    }
}
