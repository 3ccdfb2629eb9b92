//! Static table schema declarations.
//!
//! # Responsibility
//! - Describe one table: name, primary-key column and column type tags.
//! - Validate declarations once, when the schema is built.
//!
//! # Invariants
//! - Table and column names are plain identifiers.
//! - The primary-key column is always part of the column map.
//! - A built schema is immutable.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Primary-key column used when a schema does not name one.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Scalar type tag for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    String,
    Boolean,
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Boolean => "boolean",
        };
        write!(f, "{label}")
    }
}

/// Schema declaration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    InvalidTableName(String),
    InvalidColumnName(String),
    DuplicateColumn(String),
    MissingPrimaryKey { table: String, primary_key: String },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTableName(value) => write!(f, "invalid table name: `{value}`"),
            Self::InvalidColumnName(value) => write!(f, "invalid column name: `{value}`"),
            Self::DuplicateColumn(value) => write!(f, "column declared twice: `{value}`"),
            Self::MissingPrimaryKey { table, primary_key } => write!(
                f,
                "primary key `{primary_key}` is not a column of table `{table}`"
            ),
        }
    }
}

impl Error for SchemaError {}

/// Immutable description of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    table: String,
    primary_key: String,
    columns: BTreeMap<String, ColumnType>,
}

impl Schema {
    /// Starts a schema declaration for `table` with primary key `id`.
    pub fn builder(table: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            table: table.into(),
            primary_key: DEFAULT_PRIMARY_KEY.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Type tag of the primary-key column.
    pub fn primary_key_type(&self) -> ColumnType {
        // Builder guarantees the key is present.
        self.columns
            .get(&self.primary_key)
            .copied()
            .unwrap_or(ColumnType::Integer)
    }

    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        self.columns.get(column).copied()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Column names in sorted order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    table: String,
    primary_key: String,
    columns: Vec<(String, ColumnType)>,
}

impl SchemaBuilder {
    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    pub fn column(mut self, name: impl Into<String>, kind: ColumnType) -> Self {
        self.columns.push((name.into(), kind));
        self
    }

    /// Validates the declaration and freezes it.
    ///
    /// # Errors
    /// - `InvalidTableName` / `InvalidColumnName` for non-identifier names.
    /// - `DuplicateColumn` when a name is declared twice.
    /// - `MissingPrimaryKey` when the key column was never declared.
    pub fn build(self) -> Result<Schema, SchemaError> {
        if !is_identifier(&self.table) {
            return Err(SchemaError::InvalidTableName(self.table));
        }

        let mut columns = BTreeMap::new();
        for (name, kind) in self.columns {
            if !is_identifier(&name) {
                return Err(SchemaError::InvalidColumnName(name));
            }
            if columns.insert(name.clone(), kind).is_some() {
                return Err(SchemaError::DuplicateColumn(name));
            }
        }

        if !columns.contains_key(&self.primary_key) {
            return Err(SchemaError::MissingPrimaryKey {
                table: self.table,
                primary_key: self.primary_key,
            });
        }

        Ok(Schema {
            table: self.table,
            primary_key: self.primary_key,
            columns,
        })
    }
}

/// A concrete record kind bound to one table.
///
/// Implementors usually keep their schema in a `Lazy<Arc<Schema>>` so it is
/// declared once per process:
///
/// ```ignore
/// static USERS: Lazy<Arc<Schema>> = Lazy::new(|| {
///     Arc::new(
///         Schema::builder("users")
///             .column("id", ColumnType::Integer)
///             .column("name", ColumnType::String)
///             .build()
///             .expect("valid users schema"),
///     )
/// });
///
/// struct User;
///
/// impl RecordDefinition for User {
///     fn schema() -> Arc<Schema> {
///         Arc::clone(&USERS)
///     }
/// }
/// ```
pub trait RecordDefinition {
    fn schema() -> Arc<Schema>;
}

fn is_identifier(value: &str) -> bool {
    IDENTIFIER_RE.is_match(value)
}
