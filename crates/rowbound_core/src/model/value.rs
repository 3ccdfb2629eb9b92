//! Scalar column values.
//!
//! # Responsibility
//! - Define the closed value union stored in a record's data mapping.
//! - Provide conversions from plain Rust scalars.
//!
//! # Invariants
//! - `Value::Null` is the only variant compatible with every column type.
//! - Non-null variants map one-to-one onto `ColumnType`.

use crate::model::schema::ColumnType;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One scalar cell of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
    Boolean(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns whether this value counts as an empty primary key.
    ///
    /// Null, `0`, `false` and the empty string are all empty.
    pub fn is_empty_key(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Integer(value) => *value == 0,
            Self::Text(value) => value.is_empty(),
            Self::Boolean(value) => !*value,
        }
    }

    /// Returns the column type this value belongs to, or `None` for null.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Self::Null => None,
            Self::Integer(_) => Some(ColumnType::Integer),
            Self::Text(_) => Some(ColumnType::String),
            Self::Boolean(_) => Some(ColumnType::Boolean),
        }
    }

    /// Returns whether this value may be stored in a column of `kind`.
    pub fn fits(&self, kind: ColumnType) -> bool {
        self.column_type().map_or(true, |own| own == kind)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    /// Short variant label used in error messages.
    pub fn kind_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Text(_) => "string",
            Self::Boolean(_) => "boolean",
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value}"),
            Self::Boolean(value) => write!(f, "{value}"),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
