//! Statement text and parameter assembly for record operations.
//!
//! # Invariants
//! - Only schema-validated identifiers reach the SQL text, always quoted.
//! - Values are bound as positional `?` parameters, except the inline
//!   update key which is an `i64` rendered by `format!`.

use crate::db::dialect::Dialect;
use crate::db::driver::BoundParam;
use crate::model::schema::{ColumnType, Schema};
use crate::model::value::Value;

/// Statement text plus its positional parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Statement {
    pub sql: String,
    pub params: Vec<BoundParam>,
}

/// WHERE key for an update statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UpdateKey {
    Literal(i64),
    Bound(Value),
}

pub(crate) fn select_by_key(dialect: Dialect, schema: &Schema, id: Value) -> Statement {
    Statement {
        sql: format!(
            "SELECT * FROM {} WHERE {} = ?",
            dialect.quote(schema.table()),
            dialect.quote(schema.primary_key())
        ),
        params: vec![BoundParam::new(id, schema.primary_key_type())],
    }
}

pub(crate) fn insert(dialect: Dialect, schema: &Schema, values: &[(&str, &Value)]) -> Statement {
    let table = dialect.quote(schema.table());
    if values.is_empty() {
        return Statement {
            sql: format!("INSERT INTO {table} DEFAULT VALUES"),
            params: Vec::new(),
        };
    }

    let columns = values
        .iter()
        .map(|(column, _)| dialect.quote(column))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; values.len()].join(", ");

    Statement {
        sql: format!("INSERT INTO {table} ({columns}) VALUES ({placeholders})"),
        params: bind_all(schema, values),
    }
}

pub(crate) fn update(
    dialect: Dialect,
    schema: &Schema,
    values: &[(&str, &Value)],
    key: UpdateKey,
) -> Statement {
    let assignments = values
        .iter()
        .map(|(column, _)| format!("{} = ?", dialect.quote(column)))
        .collect::<Vec<_>>()
        .join(", ");
    let mut params = bind_all(schema, values);

    let key_sql = match key {
        UpdateKey::Literal(id) => id.to_string(),
        UpdateKey::Bound(value) => {
            params.push(BoundParam::new(value, schema.primary_key_type()));
            "?".to_string()
        }
    };

    Statement {
        sql: format!(
            "UPDATE {} SET {assignments} WHERE {} = {key_sql}",
            dialect.quote(schema.table()),
            dialect.quote(schema.primary_key())
        ),
        params,
    }
}

pub(crate) fn delete(dialect: Dialect, schema: &Schema, id: i64) -> Statement {
    Statement {
        sql: format!(
            "DELETE FROM {} WHERE {} = ?",
            dialect.quote(schema.table()),
            dialect.quote(schema.primary_key())
        ),
        params: vec![BoundParam::new(Value::Integer(id), ColumnType::Integer)],
    }
}

fn bind_all(schema: &Schema, values: &[(&str, &Value)]) -> Vec<BoundParam> {
    values
        .iter()
        .filter_map(|(column, value)| {
            schema
                .column_type(column)
                .map(|kind| BoundParam::new((*value).clone(), kind))
        })
        .collect()
}
