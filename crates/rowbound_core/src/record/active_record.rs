//! Active record over one table row.
//!
//! # Responsibility
//! - Hold typed column values for one row and validate them against schema.
//! - Load, insert, update and delete that row through `SqlConnection`.
//! - Publish lifecycle events around save and delete.
//!
//! # Invariants
//! - Every key in the data mapping is a schema column.
//! - Every stored value fits its column type (or is null).
//! - Insert vs update is decided only by the primary-key value being empty.
//! - A vetoed save/delete issues no statement.

use crate::db::dialect::Dialect;
use crate::db::driver::{FetchedRow, SqlConnection};
use crate::event::{EventNotifier, RecordEvent, Verdict};
use crate::model::schema::{ColumnType, RecordDefinition, Schema};
use crate::model::value::Value;
use crate::record::config::{KeyPlacement, RecordConfig};
use crate::record::error::{RecordError, RecordResult};
use crate::record::sql::{self, UpdateKey};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Serializable copy of a record's current state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub table: String,
    pub primary_key: String,
    pub values: BTreeMap<String, Value>,
}

/// One table row bound to a borrowed connection.
pub struct Record<'conn> {
    conn: &'conn dyn SqlConnection,
    schema: Arc<Schema>,
    data: BTreeMap<String, Value>,
    notifier: Option<Arc<EventNotifier>>,
    config: RecordConfig,
}

impl<'conn> Record<'conn> {
    /// Creates an unloaded record for `schema`.
    pub fn new(conn: &'conn dyn SqlConnection, schema: Arc<Schema>) -> Self {
        Self {
            conn,
            schema,
            data: BTreeMap::new(),
            notifier: None,
            config: RecordConfig::default(),
        }
    }

    /// Creates an unloaded record for a [`RecordDefinition`].
    pub fn of<D: RecordDefinition>(conn: &'conn dyn SqlConnection) -> Self {
        Self::new(conn, D::schema())
    }

    pub fn with_notifier(mut self, notifier: Arc<EventNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_config(mut self, config: RecordConfig) -> Self {
        self.config = config;
        self
    }

    pub fn table(&self) -> &str {
        self.schema.table()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> RecordConfig {
        self.config
    }

    /// Current column values, keyed by column name.
    pub fn data(&self) -> &BTreeMap<String, Value> {
        &self.data
    }

    /// Returns the current value of `column`, `None` when unset.
    ///
    /// # Errors
    /// - `UnknownColumn` when `column` is not part of the schema.
    pub fn get(&self, column: &str) -> RecordResult<Option<&Value>> {
        self.ensure_column(column)?;
        Ok(self.data.get(column))
    }

    /// Stores `value` for `column`.
    ///
    /// # Errors
    /// - `UnknownColumn` when `column` is not part of the schema.
    /// - `TypeMismatch` when `value` does not fit the column type.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> RecordResult<()> {
        let value = value.into();
        self.check_assignment(column, &value)?;
        self.data.insert(column.to_string(), value);
        Ok(())
    }

    /// Sets several columns. Nothing is stored unless every pair is valid.
    pub fn fill<I, K, V>(&mut self, values: I) -> RecordResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let pending = values
            .into_iter()
            .map(|(column, value)| (column.into(), value.into()))
            .collect::<Vec<(String, Value)>>();
        for (column, value) in &pending {
            self.check_assignment(column, value)?;
        }
        self.data.extend(pending);
        Ok(())
    }

    /// Returns whether `column` holds a non-null value.
    pub fn has(&self, column: &str) -> bool {
        self.data.get(column).is_some_and(|value| !value.is_null())
    }

    /// Removes the value of `column`; no-op when it is not set.
    ///
    /// # Errors
    /// - `UnknownColumn` when `column` is not part of the schema.
    pub fn unset(&mut self, column: &str) -> RecordResult<()> {
        self.ensure_column(column)?;
        self.data.remove(column);
        Ok(())
    }

    pub fn primary_key_value(&self) -> Option<&Value> {
        self.data.get(self.schema.primary_key())
    }

    /// Returns whether the next save inserts a new row.
    pub fn is_new(&self) -> bool {
        self.primary_key_value().map_or(true, Value::is_empty_key)
    }

    /// Quotes `name` for the connection's driver dialect.
    pub fn quote_identifier(&self, name: &str) -> String {
        Dialect::detect(self.conn).quote(name)
    }

    /// Replaces the data mapping with the row whose key equals `id`.
    ///
    /// On error the data mapping is left untouched.
    ///
    /// # Errors
    /// - `TypeMismatch` when `id` does not fit the primary-key type.
    /// - `NotFound` when no row matches.
    /// - `StatementPrepareFailed` / `StatementExecuteFailed` on driver errors.
    /// - `InvalidData` when a fetched cell cannot be decoded.
    pub fn load(&mut self, id: impl Into<Value>) -> RecordResult<&mut Self> {
        let id = coerce_key(id.into(), self.schema.primary_key_type());
        self.check_assignment(self.schema.primary_key(), &id)?;

        let stmt = sql::select_by_key(Dialect::detect(self.conn), &self.schema, id.clone());
        let row = match self.conn.fetch_one(&stmt.sql, &stmt.params) {
            Ok(row) => row,
            Err(err) => {
                let err = RecordError::from(err);
                self.log_failure("record_load", &err);
                return Err(err);
            }
        };

        let Some(row) = row else {
            debug!(
                "event=record_load module=record status=not_found table={}",
                self.table()
            );
            return Err(RecordError::NotFound {
                table: self.table().to_string(),
                id: id.to_string(),
            });
        };

        self.data = decode_row(&self.schema, row)?;
        debug!(
            "event=record_load module=record status=ok table={} columns={}",
            self.table(),
            self.data.len()
        );
        Ok(self)
    }

    /// Reloads the row addressed by the current primary key.
    ///
    /// # Errors
    /// - `NotLoaded` when the primary key is empty.
    /// - Any error of [`Record::load`].
    pub fn reload(&mut self) -> RecordResult<&mut Self> {
        let id = match self.primary_key_value() {
            Some(value) if !value.is_empty_key() => value.clone(),
            _ => return Err(self.not_loaded()),
        };
        self.load(id)
    }

    /// Inserts or updates the row.
    ///
    /// Returns `Ok(false)` when a `BeforeSave` listener vetoes.
    ///
    /// # Errors
    /// - `UnknownColumn` when pending data names a non-schema column.
    /// - `InvalidPrimaryKey` when an inline update key is not an integer.
    /// - `StatementPrepareFailed` / `StatementExecuteFailed` on driver errors.
    pub fn save(&mut self) -> RecordResult<bool> {
        let started_at = Instant::now();
        self.validate_data()?;

        let insert = self.is_new();
        if self.dispatch(RecordEvent::BeforeSave {
            insert,
            record: &*self,
        }) == Verdict::Veto
        {
            info!(
                "event=record_save module=record status=vetoed table={} mode={}",
                self.table(),
                save_mode(insert)
            );
            return Ok(false);
        }

        let result = if insert {
            self.insert_row()
        } else {
            self.update_row()
        };
        if let Err(err) = result {
            self.log_failure("record_save", &err);
            return Err(err);
        }

        info!(
            "event=record_save module=record status=ok table={} mode={} columns={} duration_ms={}",
            self.table(),
            save_mode(insert),
            self.data.len(),
            started_at.elapsed().as_millis()
        );
        self.dispatch(RecordEvent::AfterSave { record: &*self });
        Ok(true)
    }

    /// Deletes the row addressed by the primary key.
    ///
    /// Returns `Ok(false)` when a `BeforeDelete` listener vetoes.
    ///
    /// # Errors
    /// - `NotLoaded` when the primary key is empty.
    /// - `InvalidPrimaryKey` when the key is not an integer.
    /// - `DeleteFailed` when the statement fails.
    pub fn delete(&mut self) -> RecordResult<bool> {
        let started_at = Instant::now();
        let key = match self.primary_key_value() {
            Some(value) if !value.is_empty_key() => value,
            _ => return Err(self.not_loaded()),
        };
        let id = self.integer_key(key)?;

        if self.dispatch(RecordEvent::BeforeDelete { record: &*self }) == Verdict::Veto {
            info!(
                "event=record_delete module=record status=vetoed table={}",
                self.table()
            );
            return Ok(false);
        }

        let stmt = sql::delete(Dialect::detect(self.conn), &self.schema, id);
        if let Err(failure) = self.conn.execute_bound(&stmt.sql, &stmt.params) {
            let err = RecordError::DeleteFailed(failure);
            self.log_failure("record_delete", &err);
            return Err(err);
        }

        info!(
            "event=record_delete module=record status=ok table={} duration_ms={}",
            self.table(),
            started_at.elapsed().as_millis()
        );
        self.dispatch(RecordEvent::AfterDelete { record: &*self });
        Ok(true)
    }

    /// Returns a serializable copy of the current state.
    pub fn snapshot(&self) -> RecordSnapshot {
        RecordSnapshot {
            table: self.table().to_string(),
            primary_key: self.schema.primary_key().to_string(),
            values: self.data.clone(),
        }
    }

    fn insert_row(&mut self) -> RecordResult<()> {
        let primary_key = self.schema.primary_key();
        // An empty key stays out of the column list so the database assigns one.
        let values = self
            .data
            .iter()
            .filter(|(column, value)| column.as_str() != primary_key || !value.is_empty_key())
            .map(|(column, value)| (column.as_str(), value))
            .collect::<Vec<_>>();

        let stmt = sql::insert(Dialect::detect(self.conn), &self.schema, &values);
        self.conn.execute_bound(&stmt.sql, &stmt.params)?;

        let generated = generated_key(self.schema.primary_key_type(), self.conn.last_insert_id());
        self.data
            .insert(self.schema.primary_key().to_string(), generated);
        Ok(())
    }

    fn update_row(&mut self) -> RecordResult<()> {
        let key = match (self.config.update_key, self.primary_key_value()) {
            (KeyPlacement::InlineLiteral, Some(value)) => {
                UpdateKey::Literal(self.integer_key(value)?)
            }
            (KeyPlacement::Bound, Some(value)) => UpdateKey::Bound(value.clone()),
            (_, None) => return Err(self.not_loaded()),
        };

        let values = self
            .data
            .iter()
            .map(|(column, value)| (column.as_str(), value))
            .collect::<Vec<_>>();
        let stmt = sql::update(Dialect::detect(self.conn), &self.schema, &values, key);
        let changed = self.conn.execute_bound(&stmt.sql, &stmt.params)?;
        if changed == 0 {
            debug!(
                "event=record_save module=record status=no_rows_changed table={}",
                self.table()
            );
        }
        Ok(())
    }

    fn dispatch(&self, event: RecordEvent<'_>) -> Verdict {
        match &self.notifier {
            Some(notifier) => notifier.notify(&event),
            None => Verdict::Continue,
        }
    }

    fn validate_data(&self) -> RecordResult<()> {
        for column in self.data.keys() {
            self.ensure_column(column)?;
        }
        Ok(())
    }

    fn ensure_column(&self, column: &str) -> RecordResult<()> {
        if self.schema.contains(column) {
            return Ok(());
        }
        Err(RecordError::UnknownColumn {
            table: self.table().to_string(),
            column: column.to_string(),
        })
    }

    fn check_assignment(&self, column: &str, value: &Value) -> RecordResult<()> {
        let Some(kind) = self.schema.column_type(column) else {
            return Err(RecordError::UnknownColumn {
                table: self.table().to_string(),
                column: column.to_string(),
            });
        };
        if !value.fits(kind) {
            return Err(RecordError::TypeMismatch {
                column: column.to_string(),
                expected: kind,
                found: value.kind_label(),
            });
        }
        Ok(())
    }

    fn integer_key(&self, value: &Value) -> RecordResult<i64> {
        let parsed = match value {
            Value::Integer(id) => Some(*id),
            Value::Text(text) => text.trim().parse::<i64>().ok(),
            Value::Null | Value::Boolean(_) => None,
        };
        parsed.ok_or_else(|| RecordError::InvalidPrimaryKey {
            table: self.table().to_string(),
            value: value.to_string(),
        })
    }

    fn not_loaded(&self) -> RecordError {
        RecordError::NotLoaded {
            table: self.table().to_string(),
        }
    }

    fn log_failure(&self, event: &str, err: &RecordError) {
        error!(
            "event={event} module=record status=error table={} error_code={} error={}",
            self.table(),
            err.code(),
            err
        );
    }
}

impl Debug for Record<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("table", &self.schema.table())
            .field("data", &self.data)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn save_mode(insert: bool) -> &'static str {
    if insert {
        "insert"
    } else {
        "update"
    }
}

fn coerce_key(id: Value, kind: ColumnType) -> Value {
    match (&id, kind) {
        (Value::Text(text), ColumnType::Integer) => text
            .trim()
            .parse::<i64>()
            .map_or(id.clone(), Value::Integer),
        (Value::Integer(number), ColumnType::String) => Value::Text(number.to_string()),
        _ => id,
    }
}

fn generated_key(kind: ColumnType, id: i64) -> Value {
    match kind {
        ColumnType::Integer => Value::Integer(id),
        ColumnType::String => Value::Text(id.to_string()),
        ColumnType::Boolean => Value::Boolean(id != 0),
    }
}

fn decode_row(schema: &Schema, row: FetchedRow) -> RecordResult<BTreeMap<String, Value>> {
    let mut data = BTreeMap::new();
    let mut skipped = 0_usize;
    for (column, raw) in row {
        match schema.column_type(&column) {
            Some(kind) => {
                let value = decode_cell(&column, kind, raw)?;
                data.insert(column, value);
            }
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(
            "event=record_decode module=record status=ok table={} skipped_columns={}",
            schema.table(),
            skipped
        );
    }
    Ok(data)
}

fn decode_cell(column: &str, kind: ColumnType, raw: Value) -> RecordResult<Value> {
    let invalid = |raw: &Value| {
        RecordError::InvalidData(format!(
            "cannot decode {} `{raw}` as {kind} for column `{column}`",
            raw.kind_label()
        ))
    };

    let decoded = match (kind, raw) {
        (_, Value::Null) => Value::Null,
        (ColumnType::Integer, Value::Integer(number)) => Value::Integer(number),
        (ColumnType::Integer, Value::Boolean(flag)) => Value::Integer(i64::from(flag)),
        (ColumnType::Integer, Value::Text(text)) => match text.trim().parse::<i64>() {
            Ok(number) => Value::Integer(number),
            Err(_) => return Err(invalid(&Value::Text(text))),
        },
        (ColumnType::String, Value::Text(text)) => Value::Text(text),
        (ColumnType::String, Value::Integer(number)) => Value::Text(number.to_string()),
        (ColumnType::String, Value::Boolean(flag)) => Value::Text(flag.to_string()),
        (ColumnType::Boolean, Value::Boolean(flag)) => Value::Boolean(flag),
        (ColumnType::Boolean, Value::Integer(number)) => Value::Boolean(number != 0),
        (ColumnType::Boolean, Value::Text(text)) => match text.trim() {
            "1" | "true" => Value::Boolean(true),
            "0" | "false" | "" => Value::Boolean(false),
            _ => return Err(invalid(&Value::Text(text))),
        },
    };
    Ok(decoded)
}
