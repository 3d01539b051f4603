//! Ticket data model.

pub mod ticket;
pub mod uid;

pub use ticket::{NewTicket, ParseEnumError, State, Ticket, TicketEdit, Tickets, ValidationError};
pub use uid::{generate_uid, is_valid_uid};
