pub mod add;
pub mod clear;
pub mod completions;
pub mod delete;
pub mod edit;
pub mod export;
pub mod import;
pub mod list;
pub mod show;
pub mod toggle_form;

use crate::output::{CliError, OutputMode, fail, render_error};
use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use ticketbox_core::command::Dispatcher;
use ticketbox_core::config::UserConfig;
use ticketbox_core::error::{ErrorCode, TicketError};
use ticketbox_core::model::{Ticket, is_valid_uid};
use ticketbox_core::repository::TicketRepository;
use ticketbox_core::storage::FileStore;

/// Everything a command handler needs besides its own arguments.
#[derive(Debug, Clone)]
pub struct Context {
    pub output: OutputMode,
    pub data_dir: PathBuf,
    pub config: UserConfig,
    pub quiet: bool,
}

impl Context {
    /// A dispatcher over the file store in the resolved data directory.
    pub fn dispatcher(&self) -> Dispatcher<FileStore> {
        Dispatcher::new(TicketRepository::new(FileStore::new(&self.data_dir)))
    }
}

/// Ask a yes/no question on stderr.
///
/// Answers yes without asking when stdin or stdout is not a terminal.
pub fn confirm(question: &str) -> anyhow::Result<bool> {
    if !std::io::stdin().is_terminal() || !std::io::stdout().is_terminal() {
        return Ok(true);
    }

    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(is_yes(&input))
}

fn is_yes(answer: &str) -> bool {
    let answer = answer.trim().to_ascii_lowercase();
    answer == "y" || answer == "yes"
}

/// Reject malformed uids before touching the store.
pub fn validate_uid(output: OutputMode, uid: &str) -> anyhow::Result<()> {
    if is_valid_uid(uid) {
        return Ok(());
    }
    let code = ErrorCode::InvalidUid;
    render_error(
        output,
        &CliError::with_details(
            format!("invalid ticket id '{uid}'"),
            code.hint().unwrap_or_default(),
            code.code(),
        ),
    )?;
    anyhow::bail!("invalid ticket id '{uid}'")
}

/// Load the ticket named on the command line, reporting unknown uids.
pub fn require_ticket(
    ctx: &Context,
    dispatcher: &Dispatcher<FileStore>,
    uid: &str,
) -> anyhow::Result<Ticket> {
    validate_uid(ctx.output, uid)?;
    match dispatcher.repository().get(uid) {
        Ok(Some(ticket)) => Ok(ticket),
        Ok(None) => Err(fail(
            ctx.output,
            TicketError::NotFound {
                uid: uid.to_string(),
            },
        )),
        Err(err) => Err(fail(ctx.output, err)),
    }
}
