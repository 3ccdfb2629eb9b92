//! Active record layer.
//!
//! # Responsibility
//! - Own the load/save/delete protocol for a single table row.
//! - Keep statement text assembly separate from lifecycle orchestration.
//!
//! # Invariants
//! - Records never retry; driver failures propagate to the caller.
//! - Every write is a single statement.

mod active_record;
pub mod config;
pub mod error;
mod sql;

pub use active_record::{Record, RecordSnapshot};
pub use config::{KeyPlacement, RecordConfig};
pub use error::{RecordError, RecordResult};
