//! Headless view model: rows, expansion state, and the inline edit form.
//!
//! Rows are rebuilt from scratch after every mutation; nothing here is
//! persisted. Front ends render [`TicketRow`]s and route every change back
//! through the dispatcher.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use chrono::{Local, TimeZone};

use crate::model::{State, Ticket, TicketEdit, Tickets, ValidationError};
use crate::sort::SortSetting;

/// Default `strftime` pattern for timestamps.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Row striping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    #[must_use]
    pub const fn of(index: usize) -> Self {
        if index % 2 == 0 { Self::Even } else { Self::Odd }
    }
}

/// One rendered ticket: the snapshot plus its display strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRow {
    pub ticket: Ticket,
    pub parity: Parity,
    pub state_label: &'static str,
    pub created_text: String,
    pub modified_text: String,
}

impl TicketRow {
    /// Hover text for the modified column.
    #[must_use]
    pub fn tooltip(&self) -> String {
        format!(
            "Created: {}\nModified: {}",
            self.created_text, self.modified_text
        )
    }

    #[must_use]
    pub fn uid(&self) -> &str {
        &self.ticket.uid
    }
}

/// Render epoch milliseconds as local time.
///
/// Falls back to [`DEFAULT_DATE_FORMAT`] when `format` is not a valid
/// pattern, and to the raw number when the instant is out of range.
#[must_use]
pub fn format_timestamp(ms: i64, format: &str) -> String {
    let Some(at) = Local.timestamp_millis_opt(ms).single() else {
        return ms.to_string();
    };
    let mut out = String::new();
    if write!(out, "{}", at.format(format)).is_ok() {
        return out;
    }
    out.clear();
    match write!(out, "{}", at.format(DEFAULT_DATE_FORMAT)) {
        Ok(()) => out,
        Err(_) => ms.to_string(),
    }
}

/// Build the rows for `tickets` under `setting`, with the default date format.
#[must_use]
pub fn build_rows(tickets: &Tickets, setting: &SortSetting) -> Vec<TicketRow> {
    build_rows_with(tickets, setting, DEFAULT_DATE_FORMAT)
}

/// Build the rows for `tickets` under `setting`.
///
/// Uids the order names but the collection lacks are skipped.
#[must_use]
pub fn build_rows_with(tickets: &Tickets, setting: &SortSetting, date_format: &str) -> Vec<TicketRow> {
    setting
        .order(tickets)
        .iter()
        .filter_map(|uid| tickets.get(uid))
        .enumerate()
        .map(|(index, ticket)| TicketRow {
            ticket: ticket.clone(),
            parity: Parity::of(index),
            state_label: ticket.state.label(),
            created_text: format_timestamp(ticket.created, date_format),
            modified_text: format_timestamp(ticket.modified, date_format),
        })
        .collect()
}

/// Which detail rows are open, and the fragment naming the last one opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    expanded: BTreeSet<String>,
    fragment: Option<String>,
}

impl ViewState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_expanded(&self, uid: &str) -> bool {
        self.expanded.contains(uid)
    }

    /// The uid of the most recently expanded ticket, if still open.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Flip the detail row of `uid`.
    ///
    /// Other rows are left alone. Returns the new expanded state, or `None`
    /// if `uid` is not among `rows`.
    pub fn toggle(&mut self, rows: &[TicketRow], uid: &str) -> Option<bool> {
        if !rows.iter().any(|row| row.uid() == uid) {
            return None;
        }
        if self.expanded.remove(uid) {
            self.fragment = None;
            Some(false)
        } else {
            self.expanded.insert(uid.to_string());
            self.fragment = Some(uid.to_string());
            Some(true)
        }
    }

    /// Drop expansions of tickets no longer rendered.
    pub fn retain(&mut self, rows: &[TicketRow]) {
        self.expanded
            .retain(|uid| rows.iter().any(|row| row.uid() == uid));
        if self
            .fragment
            .as_deref()
            .is_some_and(|uid| !self.expanded.contains(uid))
        {
            self.fragment = None;
        }
    }
}

/// Field of a [`DetailForm`] that has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailField {
    #[default]
    Subject,
    Text,
    Priority,
    State,
}

impl DetailField {
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Subject => Self::Text,
            Self::Text => Self::Priority,
            Self::Priority => Self::State,
            Self::State => Self::Subject,
        }
    }

    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::Subject => Self::State,
            Self::Text => Self::Subject,
            Self::Priority => Self::Text,
            Self::State => Self::Priority,
        }
    }
}

/// Editable copy of a ticket's mutable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailForm {
    pub uid: String,
    pub subject: String,
    pub text: String,
    pub priority: bool,
    pub state: State,
    pub focus: DetailField,
}

impl DetailForm {
    #[must_use]
    pub fn from_ticket(ticket: &Ticket) -> Self {
        Self {
            uid: ticket.uid.clone(),
            subject: ticket.subject.clone(),
            text: ticket.text.clone(),
            priority: ticket.priority,
            state: ticket.state,
            focus: DetailField::Subject,
        }
    }

    /// Read the form back as an edit.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySubject`] when the subject is empty.
    pub fn save(&self) -> Result<TicketEdit, ValidationError> {
        if self.subject.is_empty() {
            return Err(ValidationError::EmptySubject);
        }
        Ok(TicketEdit {
            subject: self.subject.clone(),
            text: self.text.clone(),
            priority: self.priority,
            state: self.state,
        })
    }

    /// Height of the text area for the current text.
    #[must_use]
    pub fn text_height(&self) -> u16 {
        text_height(&self.text)
    }
}

/// Auto-grow height of a text area: one line per content line, at least one.
#[must_use]
pub fn text_height(text: &str) -> u16 {
    let lines = text.split('\n').count().max(1);
    u16::try_from(lines).unwrap_or(u16::MAX)
}
