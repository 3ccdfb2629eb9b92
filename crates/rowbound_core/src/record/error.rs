//! Record error taxonomy.

use crate::db::driver::{DriverError, StatementFailure};
use crate::model::schema::ColumnType;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RecordResult<T> = Result<T, RecordError>;

/// Errors raised by [`crate::Record`] operations.
///
/// A listener veto is not an error; vetoed operations return `Ok(false)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    UnknownColumn {
        table: String,
        column: String,
    },
    TypeMismatch {
        column: String,
        expected: ColumnType,
        found: &'static str,
    },
    NotFound {
        table: String,
        id: String,
    },
    /// Delete or reload attempted without a primary-key value.
    NotLoaded {
        table: String,
    },
    /// Primary key cannot be used as an integer key.
    InvalidPrimaryKey {
        table: String,
        value: String,
    },
    /// A fetched cell cannot be decoded into its column type.
    InvalidData(String),
    StatementPrepareFailed(DriverError),
    StatementExecuteFailed(DriverError),
    DeleteFailed(StatementFailure),
}

impl RecordError {
    /// Stable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownColumn { .. } => "unknown_column",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::NotFound { .. } => "not_found",
            Self::NotLoaded { .. } => "not_loaded",
            Self::InvalidPrimaryKey { .. } => "invalid_primary_key",
            Self::InvalidData(_) => "invalid_data",
            Self::StatementPrepareFailed(_) => "statement_prepare_failed",
            Self::StatementExecuteFailed(_) => "statement_execute_failed",
            Self::DeleteFailed(_) => "delete_failed",
        }
    }
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownColumn { table, column } => {
                write!(f, "unknown column `{column}` for table `{table}`")
            }
            Self::TypeMismatch {
                column,
                expected,
                found,
            } => write!(
                f,
                "column `{column}` expects {expected} value, got {found}"
            ),
            Self::NotFound { table, id } => write!(f, "no row in `{table}` with key {id}"),
            Self::NotLoaded { table } => {
                write!(f, "record of `{table}` has no primary key value")
            }
            Self::InvalidPrimaryKey { table, value } => {
                write!(f, "primary key `{value}` of `{table}` is not an integer")
            }
            Self::InvalidData(message) => write!(f, "invalid fetched data: {message}"),
            Self::StatementPrepareFailed(err) => write!(f, "statement prepare failed: {err}"),
            Self::StatementExecuteFailed(err) => write!(f, "statement execute failed: {err}"),
            Self::DeleteFailed(err) => write!(f, "delete failed: {err}"),
        }
    }
}

impl Error for RecordError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StatementPrepareFailed(err) | Self::StatementExecuteFailed(err) => Some(err),
            Self::DeleteFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StatementFailure> for RecordError {
    fn from(value: StatementFailure) -> Self {
        match value {
            StatementFailure::Prepare(err) => Self::StatementPrepareFailed(err),
            StatementFailure::Execute(err) => Self::StatementExecuteFailed(err),
        }
    }
}
