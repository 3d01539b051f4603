//! Transient status messages.

use std::time::{Duration, Instant};

/// How long a flash stays up unless configured otherwise.
pub const DEFAULT_FLASH_TTL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Info,
    Error,
}

/// A message that disappears after a short time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub message: String,
    pub kind: FlashKind,
    pub shown_at: Instant,
}

impl Flash {
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, FlashKind::Info)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, FlashKind::Error)
    }

    fn new(message: impl Into<String>, kind: FlashKind) -> Self {
        Self {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn is_visible(&self, ttl: Duration) -> bool {
        self.is_visible_at(Instant::now(), ttl)
    }

    #[must_use]
    pub fn is_visible_at(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.shown_at) < ttl
    }
}
