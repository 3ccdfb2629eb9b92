//! Database boundary used by records.
//!
//! # Responsibility
//! - Define the statement-level connection contract (`SqlConnection`).
//! - Detect the driver dialect and quote identifiers for it.
//! - Open SQLite connections for the bundled implementation.
//!
//! # Invariants
//! - Records only talk to the database through `SqlConnection`.
//! - Dialect detection reads the driver name on every call.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod dialect;
pub mod driver;
mod open;

pub use dialect::{quote_identifier, Dialect};
pub use driver::{BoundParam, DriverError, FetchedRow, SqlConnection, StatementFailure};
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Connection bootstrap errors.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
