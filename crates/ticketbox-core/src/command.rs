//! User actions as values, and the dispatcher that applies them.
//!
//! Both front ends build a [`Command`], obtain confirmation when
//! [`Command::confirmation`] asks for it, and hand it to
//! [`Dispatcher::dispatch`]. A declined confirmation never reaches the
//! dispatcher, so it has no side effects.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::TicketError;
use crate::model::{NewTicket, Ticket, TicketEdit, Tickets, is_valid_uid};
use crate::repository::TicketRepository;
use crate::sort::{SortKey, SortSetting, SortToggle};
use crate::storage::KeyValueStore;

/// The bulk import/export document: `{"tickets": {<uid>: <ticket>, ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub tickets: Tickets,
}

impl ExportDocument {
    /// Parse and check an import payload.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::ImportParse`] if `json` is not a valid document,
    /// a ticket is stored under a key other than its uid, or a uid is not six
    /// lowercase base-36 characters.
    pub fn parse(json: &str) -> Result<Self, TicketError> {
        let doc: Self =
            serde_json::from_str(json).map_err(|err| TicketError::ImportParse(err.to_string()))?;
        if let Some(key) = doc.tickets.keys().find(|key| !is_valid_uid(key)) {
            return Err(TicketError::ImportParse(format!("invalid ticket id '{key}'")));
        }
        if let Some((key, ticket)) = doc.tickets.iter().find(|(key, t)| **key != t.uid) {
            return Err(TicketError::ImportParse(format!(
                "ticket stored under '{key}' has uid '{}'",
                ticket.uid
            )));
        }
        Ok(doc)
    }

    /// Compact JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<String, TicketError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Indented JSON encoding.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Encode`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, TicketError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortCommand {
    Column(SortKey),
    Reset,
}

/// A user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(NewTicket),
    /// Apply `edit` to the `ticket` snapshot the user was looking at.
    Update { ticket: Ticket, edit: TicketEdit },
    Delete { uid: String },
    Sort(SortCommand),
    Import { json: String },
    Export,
    Clear,
    ToggleForm,
}

impl Command {
    /// Question to confirm before dispatching, for destructive commands.
    #[must_use]
    pub const fn confirmation(&self) -> Option<&'static str> {
        match self {
            Self::Delete { .. } => Some("Are you sure?"),
            Self::Import { .. } => Some("Current data will be lost! Import anyway?"),
            Self::Clear => Some("Really delete all your data?"),
            Self::Create(_)
            | Self::Update { .. }
            | Self::Sort(_)
            | Self::Export
            | Self::ToggleForm => None,
        }
    }
}

/// What a dispatched command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Created(Ticket),
    Updated(Ticket),
    Deleted { uid: String, existed: bool },
    Sorted(SortSetting),
    Imported { count: usize },
    Exported { json: String, count: usize },
    Cleared,
    FormToggled { hidden: bool },
}

impl Outcome {
    /// Flash message for this outcome, if the action announces itself.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Created(_) => Some("Ticket added"),
            Self::Updated(_) => Some("Ticket updated"),
            Self::Deleted { .. } => Some("Ticket removed"),
            Self::Imported { .. } => Some("Tickets imported"),
            Self::Exported { .. } => Some("Tickets exported"),
            Self::Cleared => Some("Tickets cleared"),
            Self::Sorted(_) | Self::FormToggled { .. } => None,
        }
    }
}

/// Applies [`Command`]s to a repository and tracks the session's sort.
pub struct Dispatcher<S, C = SystemClock> {
    repo: TicketRepository<S, C>,
    sort: SortToggle,
}

impl<S: KeyValueStore, C: Clock> Dispatcher<S, C> {
    /// A dispatcher with no active sort column.
    pub fn new(repo: TicketRepository<S, C>) -> Self {
        Self {
            repo,
            sort: SortToggle::new(),
        }
    }

    pub const fn repository(&self) -> &TicketRepository<S, C> {
        &self.repo
    }

    pub fn repository_mut(&mut self) -> &mut TicketRepository<S, C> {
        &mut self.repo
    }

    /// The current session sort setting.
    #[must_use]
    pub const fn sort_setting(&self) -> SortSetting {
        self.sort.setting()
    }

    pub const fn sort_toggle(&self) -> &SortToggle {
        &self.sort
    }

    /// Apply `cmd`.
    ///
    /// # Errors
    ///
    /// - [`TicketError::Validation`] for an empty subject; nothing is stored.
    /// - [`TicketError::ImportParse`] for a bad import; the collection is kept.
    /// - [`TicketError::Storage`] if the store fails.
    pub fn dispatch(&mut self, cmd: Command) -> Result<Outcome, TicketError> {
        match cmd {
            Command::Create(values) => {
                values.validate()?;
                let ticket = self.repo.new_ticket(values)?;
                self.repo.add(ticket.clone())?;
                debug!(uid = %ticket.uid, "ticket added");
                Ok(Outcome::Created(ticket))
            }
            Command::Update { ticket, edit } => {
                let edited = ticket.with_edit(edit)?;
                let stored = self.repo.update(edited)?;
                debug!(uid = %stored.uid, state = stored.state.code(), "ticket updated");
                Ok(Outcome::Updated(stored))
            }
            Command::Delete { uid } => {
                let existed = self.repo.remove(&uid)?;
                debug!(uid, existed, "ticket removed");
                Ok(Outcome::Deleted { uid, existed })
            }
            Command::Sort(SortCommand::Column(key)) => Ok(Outcome::Sorted(self.sort.click(key))),
            Command::Sort(SortCommand::Reset) => Ok(Outcome::Sorted(self.sort.reset())),
            Command::Import { json } => {
                let doc = ExportDocument::parse(&json).inspect_err(|err| {
                    warn!(error = %err, "import rejected, keeping current tickets");
                })?;
                self.repo.replace_all(&doc.tickets)?;
                debug!(count = doc.tickets.len(), "tickets imported");
                Ok(Outcome::Imported {
                    count: doc.tickets.len(),
                })
            }
            Command::Export => {
                let doc = ExportDocument {
                    tickets: self.repo.load_all()?,
                };
                Ok(Outcome::Exported {
                    json: doc.to_json()?,
                    count: doc.tickets.len(),
                })
            }
            Command::Clear => {
                self.repo.replace_all(&Tickets::new())?;
                debug!("tickets cleared");
                Ok(Outcome::Cleared)
            }
            Command::ToggleForm => {
                let hidden = !self.repo.form_hidden()?.unwrap_or(false);
                self.repo.set_form_hidden(hidden)?;
                Ok(Outcome::FormToggled { hidden })
            }
        }
    }
}
