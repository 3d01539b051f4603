use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fmt, str::FromStr};

/// The canonical ticket collection, keyed by uid.
///
/// Iteration order (ascending uid) is the "unsorted" display order.
pub type Tickets = BTreeMap<String, Ticket>;

/// Message shown when a create or edit is attempted without a subject.
pub const NO_SUBJECT_MESSAGE: &str = "No subject given";

/// The four lifecycle states.
///
/// Persisted as the one-letter codes `n`, `p`, `d`, `c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum State {
    #[default]
    #[serde(rename = "n")]
    New,
    #[serde(rename = "p")]
    InProgress,
    #[serde(rename = "d")]
    Done,
    #[serde(rename = "c")]
    Canceled,
}

impl State {
    /// Every state, in the order the edit form offers them.
    pub const ALL: [Self; 4] = [Self::New, Self::InProgress, Self::Done, Self::Canceled];

    /// One-letter persisted code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::New => "n",
            Self::InProgress => "p",
            Self::Done => "d",
            Self::Canceled => "c",
        }
    }

    /// User-facing label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::InProgress => "in progress",
            Self::Done => "done",
            Self::Canceled => "canceled",
        }
    }

    /// Next state in [`State::ALL`], wrapping.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::New => Self::InProgress,
            Self::InProgress => Self::Done,
            Self::Done => Self::Canceled,
            Self::Canceled => Self::New,
        }
    }

    /// Previous state in [`State::ALL`], wrapping.
    #[must_use]
    pub const fn prev(self) -> Self {
        match self {
            Self::New => Self::Canceled,
            Self::InProgress => Self::New,
            Self::Done => Self::InProgress,
            Self::Canceled => Self::Done,
        }
    }
}

/// A single ticket as persisted in the `t:tickets` blob.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub uid: String,
    pub subject: String,
    #[serde(default)]
    pub text: String,
    /// Creation time, epoch milliseconds. Never changes.
    pub created: i64,
    /// Last modification time, epoch milliseconds.
    pub modified: i64,
    pub state: State,
    #[serde(default)]
    pub priority: bool,
}

/// Input for creating a ticket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTicket {
    pub subject: String,
    pub text: String,
}

impl NewTicket {
    pub fn new(subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            text: text.into(),
        }
    }

    /// Reject an empty subject.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySubject`] when `subject` is empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.subject.is_empty() {
            return Err(ValidationError::EmptySubject);
        }
        Ok(())
    }
}

/// The mutable fields of a ticket, as read back from an edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketEdit {
    pub subject: String,
    pub text: String,
    pub priority: bool,
    pub state: State,
}

impl TicketEdit {
    /// An edit that leaves every field of `ticket` as it is.
    #[must_use]
    pub fn from_ticket(ticket: &Ticket) -> Self {
        Self {
            subject: ticket.subject.clone(),
            text: ticket.text.clone(),
            priority: ticket.priority,
            state: ticket.state,
        }
    }
}

impl Ticket {
    /// Return a copy with the edit applied.
    ///
    /// `uid`, `created` and `modified` are carried over; the repository bumps
    /// `modified` when the result is stored.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySubject`] if the edited subject is empty.
    pub fn with_edit(&self, edit: TicketEdit) -> Result<Self, ValidationError> {
        if edit.subject.is_empty() {
            return Err(ValidationError::EmptySubject);
        }
        Ok(Self {
            uid: self.uid.clone(),
            subject: edit.subject,
            text: edit.text,
            created: self.created,
            modified: self.modified,
            state: edit.state,
            priority: edit.priority,
        })
    }
}

/// Error returned when a create or edit fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("No subject given")]
    EmptySubject,
}

/// Error returned when parsing a state from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub expected: &'static str,
    pub got: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: '{}'", self.expected, self.got)
    }
}

impl std::error::Error for ParseEnumError {}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn normalize(input: &str) -> String {
    input.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

impl FromStr for State {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        match normalized.as_str() {
            "n" | "new" => Ok(Self::New),
            "p" | "in_progress" | "progress" => Ok(Self::InProgress),
            "d" | "done" => Ok(Self::Done),
            "c" | "canceled" | "cancelled" => Ok(Self::Canceled),
            _ => Err(ParseEnumError {
                expected: "state",
                got: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NewTicket, State, Ticket, TicketEdit, ValidationError};
    use std::str::FromStr;

    fn ticket() -> Ticket {
        Ticket {
            uid: "abc123".into(),
            subject: "Fix bug".into(),
            text: String::new(),
            created: 1_000,
            modified: 1_000,
            state: State::New,
            priority: false,
        }
    }

    #[test]
    fn state_uses_one_letter_codes_on_the_wire() {
        assert_eq!(serde_json::to_string(&State::New).unwrap(), "\"n\"");
        assert_eq!(serde_json::to_string(&State::InProgress).unwrap(), "\"p\"");
        assert_eq!(serde_json::to_string(&State::Done).unwrap(), "\"d\"");
        assert_eq!(serde_json::to_string(&State::Canceled).unwrap(), "\"c\"");
        assert!(serde_json::from_str::<State>("\"x\"").is_err());
        assert!(serde_json::from_str::<State>("\"new\"").is_err());
    }

    #[test]
    fn state_labels_match_display_strings() {
        assert_eq!(State::New.to_string(), "new");
        assert_eq!(State::InProgress.to_string(), "in progress");
        assert_eq!(State::Done.to_string(), "done");
        assert_eq!(State::Canceled.to_string(), "canceled");
    }

    #[test]
    fn state_parses_codes_and_labels() {
        for state in State::ALL {
            assert_eq!(State::from_str(state.code()).unwrap(), state);
            assert_eq!(State::from_str(state.label()).unwrap(), state);
        }
        assert_eq!(State::from_str("in-progress").unwrap(), State::InProgress);
        assert_eq!(State::from_str(" DONE ").unwrap(), State::Done);
        assert!(State::from_str("archived").is_err());
    }

    #[test]
    fn state_cycles_through_all_variants() {
        let mut state = State::New;
        for _ in 0..4 {
            state = state.next();
        }
        assert_eq!(state, State::New);
        assert_eq!(State::New.prev(), State::Canceled);
        assert_eq!(State::Done.prev().next(), State::Done);
    }

    #[test]
    fn ticket_json_has_the_persisted_shape() {
        let value = serde_json::to_value(ticket()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "uid": "abc123",
                "subject": "Fix bug",
                "text": "",
                "created": 1000,
                "modified": 1000,
                "state": "n",
                "priority": false,
            })
        );
    }

    #[test]
    fn ticket_text_and_priority_default_when_absent() {
        let parsed: Ticket = serde_json::from_str(
            r#"{"uid":"abc123","subject":"s","created":1,"modified":2,"state":"d"}"#,
        )
        .unwrap();
        assert_eq!(parsed.text, "");
        assert!(!parsed.priority);
        assert_eq!(parsed.state, State::Done);
    }

    #[test]
    fn edit_replaces_mutable_fields_only() {
        let original = ticket();
        let edited = original
            .with_edit(TicketEdit {
                subject: "Fix bug v2".into(),
                text: "details".into(),
                priority: true,
                state: State::Done,
            })
            .unwrap();
        assert_eq!(edited.uid, original.uid);
        assert_eq!(edited.created, original.created);
        assert_eq!(edited.modified, original.modified);
        assert_eq!(edited.subject, "Fix bug v2");
        assert_eq!(edited.text, "details");
        assert!(edited.priority);
        assert_eq!(edited.state, State::Done);
    }

    #[test]
    fn edit_with_empty_subject_is_rejected() {
        let mut edit = TicketEdit::from_ticket(&ticket());
        edit.subject.clear();
        assert_eq!(ticket().with_edit(edit), Err(ValidationError::EmptySubject));
        assert_eq!(
            NewTicket::new("", "text").validate(),
            Err(ValidationError::EmptySubject)
        );
        assert!(NewTicket::new("x", "").validate().is_ok());
    }
}
