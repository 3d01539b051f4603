//! ticketbox-core library.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums carrying an [`error::ErrorCode`]; config
//!   loading returns `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod feedback;
pub mod model;
pub mod repository;
pub mod sort;
pub mod storage;
pub mod view;
