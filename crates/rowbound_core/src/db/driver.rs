//! SQL connection boundary and its SQLite implementation.
//!
//! # Responsibility
//! - Define the minimal statement surface a record needs from a driver.
//! - Encode bound parameters per schema type tag and decode fetched cells.
//!
//! # Invariants
//! - Every call prepares, binds, executes and drops its own statement.
//! - Prepare and execute failures stay distinguishable for callers.

use crate::model::schema::ColumnType;
use crate::model::value::Value;
use rusqlite::types::Value as SqliteValue;
use rusqlite::{params_from_iter, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One fetched row as `(column name, value)` pairs in select order.
pub type FetchedRow = Vec<(String, Value)>;

/// Driver-level failure details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    /// Driver specific error code, when the driver exposes one.
    pub code: Option<i32>,
    pub message: String,
}

impl DriverError {
    pub fn new(code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Display for DriverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{code}] {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl Error for DriverError {}

impl From<rusqlite::Error> for DriverError {
    fn from(value: rusqlite::Error) -> Self {
        let code = match &value {
            rusqlite::Error::SqliteFailure(err, _) => Some(err.extended_code),
            _ => None,
        };
        Self::new(code, value.to_string())
    }
}

/// Stage at which a statement failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementFailure {
    Prepare(DriverError),
    Execute(DriverError),
}

impl StatementFailure {
    pub fn driver_error(&self) -> &DriverError {
        match self {
            Self::Prepare(err) | Self::Execute(err) => err,
        }
    }
}

impl Display for StatementFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Prepare(err) => write!(f, "statement prepare failed: {err}"),
            Self::Execute(err) => write!(f, "statement execute failed: {err}"),
        }
    }
}

impl Error for StatementFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.driver_error())
    }
}

/// A positional parameter plus the type tag it binds as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundParam {
    pub value: Value,
    pub kind: ColumnType,
}

impl BoundParam {
    pub fn new(value: Value, kind: ColumnType) -> Self {
        Self { value, kind }
    }

    fn to_sqlite(&self) -> SqliteValue {
        match (&self.value, self.kind) {
            (Value::Null, _) => SqliteValue::Null,
            (Value::Boolean(flag), _) => SqliteValue::Integer(i64::from(*flag)),
            (Value::Integer(number), _) => SqliteValue::Integer(*number),
            (Value::Text(text), ColumnType::Integer) => match text.trim().parse::<i64>() {
                Ok(number) => SqliteValue::Integer(number),
                Err(_) => SqliteValue::Text(text.clone()),
            },
            (Value::Text(text), _) => SqliteValue::Text(text.clone()),
        }
    }
}

/// Minimal statement surface required by [`crate::Record`].
pub trait SqlConnection {
    /// Driver identifier (`sqlite`, `mysql`, `pgsql`, `sqlsrv`, ...).
    fn driver_name(&self) -> String;

    /// Runs a query and returns its first row, if any.
    fn fetch_one(
        &self,
        sql: &str,
        params: &[BoundParam],
    ) -> Result<Option<FetchedRow>, StatementFailure>;

    /// Runs a statement and returns the number of affected rows.
    fn execute_bound(&self, sql: &str, params: &[BoundParam]) -> Result<usize, StatementFailure>;

    /// Identifier generated by the most recent insert on this connection.
    fn last_insert_id(&self) -> i64;
}

impl SqlConnection for Connection {
    fn driver_name(&self) -> String {
        "sqlite".to_string()
    }

    fn fetch_one(
        &self,
        sql: &str,
        params: &[BoundParam],
    ) -> Result<Option<FetchedRow>, StatementFailure> {
        let mut stmt = self
            .prepare(sql)
            .map_err(|err| StatementFailure::Prepare(err.into()))?;
        let column_names: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt
            .query(params_from_iter(params.iter().map(BoundParam::to_sqlite)))
            .map_err(|err| StatementFailure::Execute(err.into()))?;
        let Some(row) = rows
            .next()
            .map_err(|err| StatementFailure::Execute(err.into()))?
        else {
            return Ok(None);
        };

        let mut fetched = Vec::with_capacity(column_names.len());
        for (index, name) in column_names.into_iter().enumerate() {
            let raw: SqliteValue = row
                .get(index)
                .map_err(|err| StatementFailure::Execute(err.into()))?;
            fetched.push((name, value_from_sqlite(raw)));
        }

        Ok(Some(fetched))
    }

    fn execute_bound(&self, sql: &str, params: &[BoundParam]) -> Result<usize, StatementFailure> {
        let mut stmt = self
            .prepare(sql)
            .map_err(|err| StatementFailure::Prepare(err.into()))?;
        stmt.execute(params_from_iter(params.iter().map(BoundParam::to_sqlite)))
            .map_err(|err| StatementFailure::Execute(err.into()))
    }

    fn last_insert_id(&self) -> i64 {
        self.last_insert_rowid()
    }
}

fn value_from_sqlite(raw: SqliteValue) -> Value {
    match raw {
        SqliteValue::Null => Value::Null,
        SqliteValue::Integer(number) => Value::Integer(number),
        SqliteValue::Real(number) => Value::Text(number.to_string()),
        SqliteValue::Text(text) => Value::Text(text),
        SqliteValue::Blob(bytes) => Value::Text(String::from_utf8_lossy(&bytes).into_owned()),
    }
}
