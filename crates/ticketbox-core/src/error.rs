use std::fmt;

use crate::model::ValidationError;
use crate::storage::StorageError;

/// Machine-readable error codes surfaced by the CLI and TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    TicketNotFound,
    InvalidUid,
    EmptySubject,
    InvalidEnumValue,
    ImportParseError,
    StorageReadFailed,
    StorageWriteFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1002",
            Self::TicketNotFound => "E2001",
            Self::InvalidUid => "E2002",
            Self::EmptySubject => "E2003",
            Self::InvalidEnumValue => "E2005",
            Self::ImportParseError => "E3001",
            Self::StorageReadFailed => "E5001",
            Self::StorageWriteFailed => "E5002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::TicketNotFound => "Ticket not found",
            Self::InvalidUid => "Invalid ticket id",
            Self::EmptySubject => "No subject given",
            Self::InvalidEnumValue => "Invalid state value",
            Self::ImportParseError => "Import data could not be parsed",
            Self::StorageReadFailed => "Storage read failed",
            Self::StorageWriteFailed => "Storage write failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to the user.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in ticketbox/config.toml and retry."),
            Self::TicketNotFound => Some("Run `tb list` to see the available ticket ids."),
            Self::InvalidUid => Some("Ticket ids are 6 lowercase base-36 characters, e.g. `0k3zq9`."),
            Self::EmptySubject => Some("Give the ticket a non-empty subject."),
            Self::InvalidEnumValue => Some("Use one of: new, in_progress, done, canceled."),
            Self::ImportParseError => {
                Some("Paste a JSON object of the form {\"tickets\": {...}} as produced by `tb export`.")
            }
            Self::StorageReadFailed => Some("Check that the data directory is readable."),
            Self::StorageWriteFailed => Some("Check disk space and write permissions."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Errors returned by repository and dispatcher operations.
#[derive(Debug, thiserror::Error)]
pub enum TicketError {
    /// A create/edit was rejected before anything was persisted.
    #[error("{0}")]
    Validation(String),

    /// No ticket with the given uid exists in the collection.
    #[error("ticket '{uid}' not found")]
    NotFound { uid: String },

    /// Import payload was not a valid `{"tickets": {...}}` document.
    #[error("import failed: {0}")]
    ImportParse(String),

    /// The underlying key-value store failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Serializing a blob for storage failed.
    #[error("failed to encode ticket data: {0}")]
    Encode(#[from] serde_json::Error),
}

impl TicketError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::EmptySubject,
            Self::NotFound { .. } => ErrorCode::TicketNotFound,
            Self::ImportParse(_) => ErrorCode::ImportParseError,
            Self::Storage(err) => err.code(),
            Self::Encode(_) => ErrorCode::InternalUnexpected,
        }
    }

    /// Remediation hint for this error, if any.
    #[must_use]
    pub const fn hint(&self) -> Option<&'static str> {
        self.code().hint()
    }
}

impl From<ValidationError> for TicketError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}
