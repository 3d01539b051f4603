//! Display ordering of the ticket collection.
//!
//! [`sort_by`] orders uids by one field. [`SortToggle`] holds the session's
//! column-header state and produces immutable [`SortSetting`] values that
//! are passed into each render.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::model::{ParseEnumError, Ticket, Tickets};

/// A ticket field the collection can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Uid,
    Subject,
    Text,
    Created,
    Modified,
    State,
    Priority,
}

impl SortKey {
    /// Columns with a clickable header in the table view.
    pub const COLUMNS: [Self; 3] = [Self::Subject, Self::Modified, Self::State];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Uid => "uid",
            Self::Subject => "subject",
            Self::Text => "text",
            Self::Created => "created",
            Self::Modified => "modified",
            Self::State => "state",
            Self::Priority => "priority",
        }
    }

    /// Compare two tickets on this field's natural ordering.
    ///
    /// State compares by its persisted code (`c < d < n < p`).
    #[must_use]
    pub fn compare(self, a: &Ticket, b: &Ticket) -> Ordering {
        match self {
            Self::Uid => a.uid.cmp(&b.uid),
            Self::Subject => a.subject.cmp(&b.subject),
            Self::Text => a.text.cmp(&b.text),
            Self::Created => a.created.cmp(&b.created),
            Self::Modified => a.modified.cmp(&b.modified),
            Self::State => a.state.code().cmp(b.state.code()),
            Self::Priority => a.priority.cmp(&b.priority),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uid" | "id" => Ok(Self::Uid),
            "subject" => Ok(Self::Subject),
            "text" => Ok(Self::Text),
            "created" => Ok(Self::Created),
            "modified" => Ok(Self::Modified),
            "state" => Ok(Self::State),
            "priority" => Ok(Self::Priority),
            _ => Err(ParseEnumError {
                expected: "sort key",
                got: s.to_string(),
            }),
        }
    }
}

/// Order the uids of `tickets` by `key`.
///
/// Ties keep the collection's natural order. Descending is the exact
/// reverse of ascending, ties included.
#[must_use]
pub fn sort_by(tickets: &Tickets, key: SortKey, ascending: bool) -> Vec<String> {
    let mut sortable: Vec<&Ticket> = tickets.values().collect();
    // `sort_by` is stable.
    sortable.sort_by(|a, b| key.compare(a, b));

    let mut uids: Vec<String> = sortable.into_iter().map(|t| t.uid.clone()).collect();
    if !ascending {
        uids.reverse();
    }
    uids
}

/// The sort applied to one render: an optional column and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSetting {
    pub column: Option<SortKey>,
    pub ascending: bool,
}

impl Default for SortSetting {
    fn default() -> Self {
        Self::unsorted()
    }
}

impl SortSetting {
    /// No active column: natural collection order.
    #[must_use]
    pub const fn unsorted() -> Self {
        Self {
            column: None,
            ascending: true,
        }
    }

    #[must_use]
    pub const fn by(column: SortKey, ascending: bool) -> Self {
        Self {
            column: Some(column),
            ascending,
        }
    }

    /// The display order of `tickets` under this setting.
    #[must_use]
    pub fn order(&self, tickets: &Tickets) -> Vec<String> {
        match self.column {
            Some(key) => sort_by(tickets, key, self.ascending),
            None => tickets.keys().cloned().collect(),
        }
    }

    /// Short label for status lines, e.g. `subject ▲` or `none`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.column {
            Some(key) => format!("{key} {}", if self.ascending { "▲" } else { "▼" }),
            None => "none".to_string(),
        }
    }
}

/// Column-header sort state for one session.
///
/// Clicking an inactive column activates it ascending; clicking the active
/// column flips its direction; [`SortToggle::reset`] returns to natural order.
/// Only the active column remembers a direction; every other column starts
/// ascending the next time it is clicked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortToggle {
    current: SortSetting,
}

impl SortToggle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The setting to render with.
    #[must_use]
    pub const fn setting(&self) -> SortSetting {
        self.current
    }

    /// Handle a click on the `key` column header.
    pub fn click(&mut self, key: SortKey) -> SortSetting {
        self.current = match self.current.column {
            Some(active) if active == key => SortSetting::by(key, !self.current.ascending),
            _ => SortSetting::by(key, true),
        };
        self.current
    }

    /// Clear the active column.
    pub fn reset(&mut self) -> SortSetting {
        self.current = SortSetting::unsorted();
        self.current
    }

    /// Direction arrow for `key`'s header: `Some(true)` ascending,
    /// `Some(false)` descending, `None` hidden.
    #[must_use]
    pub fn indicator(&self, key: SortKey) -> Option<bool> {
        (self.current.column == Some(key)).then_some(self.current.ascending)
    }
}
