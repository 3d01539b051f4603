//! The ticket repository: sole writer of the persisted collection.
//!
//! # Read-modify-write without isolation
//!
//! No state is cached between calls. Every operation re-reads the
//! collection from the store immediately before changing it, then writes the
//! whole collection back. Within one process this is atomic from the caller's
//! point of view, but nothing isolates two sessions sharing a store: each
//! write replaces the other's and the last write wins. No lock is taken.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use crate::clock::{Clock, SystemClock, next_modified};
use crate::error::TicketError;
use crate::model::{NewTicket, State, Ticket, Tickets, generate_uid};
use crate::storage::{Blob, KeyValueStore, TICKETS_KEY, TOGGLE_KEY, read_blob, write_blob};

/// CRUD and bulk replace over a [`KeyValueStore`].
pub struct TicketRepository<S, C = SystemClock> {
    store: S,
    clock: C,
    rng: StdRng,
}

impl<S: KeyValueStore> TicketRepository<S> {
    /// A repository on the system clock with an entropy-seeded uid generator.
    pub fn new(store: S) -> Self {
        Self::with_parts(store, SystemClock, StdRng::from_entropy())
    }
}

impl<S: KeyValueStore, C: Clock> TicketRepository<S, C> {
    /// A repository with an explicit clock and uid generator.
    pub const fn with_parts(store: S, clock: C, rng: StdRng) -> Self {
        Self { store, clock, rng }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The clock used for timestamps.
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Read the persisted collection.
    ///
    /// An absent or malformed blob yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Storage`] if the store cannot be read.
    pub fn load_all(&self) -> Result<Tickets, TicketError> {
        match read_blob::<Tickets>(&self.store, TICKETS_KEY)? {
            Blob::Value(tickets) => Ok(tickets),
            Blob::Missing => Ok(Tickets::new()),
            Blob::Malformed(reason) => {
                warn!(key = TICKETS_KEY, %reason, "ignoring malformed ticket collection");
                Ok(Tickets::new())
            }
        }
    }

    /// Look up one ticket by uid.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Storage`] if the store cannot be read.
    pub fn get(&self, uid: &str) -> Result<Option<Ticket>, TicketError> {
        Ok(self.load_all()?.remove(uid))
    }

    fn save_all(&mut self, tickets: &Tickets) -> Result<(), TicketError> {
        write_blob(&mut self.store, TICKETS_KEY, tickets)
    }

    /// Insert `ticket` under its uid and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn add(&mut self, ticket: Ticket) -> Result<(), TicketError> {
        let mut tickets = self.load_all()?;
        debug!(uid = %ticket.uid, "adding ticket");
        tickets.insert(ticket.uid.clone(), ticket);
        self.save_all(&tickets)
    }

    /// Store `ticket` with a fresh `modified` time, inserting it if absent.
    ///
    /// Returns the ticket as persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn update(&mut self, mut ticket: Ticket) -> Result<Ticket, TicketError> {
        let mut tickets = self.load_all()?;
        ticket.modified = next_modified(self.clock.now_ms(), ticket.created, ticket.modified);
        debug!(uid = %ticket.uid, modified = ticket.modified, "updating ticket");
        tickets.insert(ticket.uid.clone(), ticket.clone());
        self.save_all(&tickets)?;
        Ok(ticket)
    }

    /// Delete the ticket with `uid`. Absent uids are not an error.
    ///
    /// Returns whether a ticket was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or written.
    pub fn remove(&mut self, uid: &str) -> Result<bool, TicketError> {
        let mut tickets = self.load_all()?;
        let existed = tickets.remove(uid).is_some();
        debug!(uid, existed, "removing ticket");
        self.save_all(&tickets)?;
        Ok(existed)
    }

    /// Build a new, unpersisted ticket with a uid unused by the live collection.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Storage`] if the store cannot be read.
    pub fn new_ticket(&mut self, values: NewTicket) -> Result<Ticket, TicketError> {
        let tickets = self.load_all()?;
        let uid = loop {
            let candidate = generate_uid(&mut self.rng);
            if !tickets.contains_key(&candidate) {
                break candidate;
            }
            debug!(uid = %candidate, "uid collision, retrying");
        };

        let now = self.clock.now_ms();
        Ok(Ticket {
            uid,
            subject: values.subject,
            text: values.text,
            created: now,
            modified: now,
            state: State::New,
            priority: false,
        })
    }

    /// Discard the persisted collection and store `tickets` in its place.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn replace_all(&mut self, tickets: &Tickets) -> Result<(), TicketError> {
        debug!(count = tickets.len(), "replacing ticket collection");
        self.save_all(tickets)
    }

    /// Whether the new-ticket form was last hidden; `None` if never set.
    ///
    /// # Errors
    ///
    /// Returns [`TicketError::Storage`] if the store cannot be read.
    pub fn form_hidden(&self) -> Result<Option<bool>, TicketError> {
        match read_blob::<bool>(&self.store, TOGGLE_KEY)? {
            Blob::Value(hidden) => Ok(Some(hidden)),
            Blob::Missing => Ok(None),
            Blob::Malformed(reason) => {
                warn!(key = TOGGLE_KEY, %reason, "ignoring malformed form toggle");
                Ok(None)
            }
        }
    }

    /// Persist the form-visibility toggle.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn set_form_hidden(&mut self, hidden: bool) -> Result<(), TicketError> {
        write_blob(&mut self.store, TOGGLE_KEY, &hidden)
    }
}
