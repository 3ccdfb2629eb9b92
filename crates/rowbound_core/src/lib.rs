//! Minimal active record helper over parameterized SQL.
//! One `Record` maps to one table row; listeners observe its lifecycle.

pub mod db;
pub mod event;
pub mod logging;
pub mod model;
pub mod record;

pub use db::{quote_identifier, Dialect, DriverError, SqlConnection, StatementFailure};
pub use event::{EventKind, EventNotifier, RecordEvent, RecordListener, Verdict};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::schema::{ColumnType, RecordDefinition, Schema, SchemaBuilder, SchemaError};
pub use model::value::Value;
pub use record::{KeyPlacement, Record, RecordConfig, RecordError, RecordResult, RecordSnapshot};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
