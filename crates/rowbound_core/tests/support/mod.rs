#![allow(dead_code)]

use once_cell::sync::Lazy;
use rowbound_core::db::{open_db_in_memory, BoundParam, FetchedRow};
use rowbound_core::{
    ColumnType, RecordDefinition, Schema, SqlConnection, StatementFailure,
};
use rusqlite::Connection;
use std::cell::RefCell;
use std::sync::Arc;

static USERS: Lazy<Arc<Schema>> = Lazy::new(|| {
    Arc::new(
        Schema::builder("users")
            .column("id", ColumnType::Integer)
            .column("name", ColumnType::String)
            .column("active", ColumnType::Boolean)
            .column("age", ColumnType::Integer)
            .build()
            .expect("valid users schema"),
    )
});

/// Record definition for the `users` test table.
pub struct User;

impl RecordDefinition for User {
    fn schema() -> Arc<Schema> {
        Arc::clone(&USERS)
    }
}

pub const CREATE_USERS_SQL: &str = "CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT,
    active INTEGER,
    age INTEGER,
    nickname TEXT
);";

pub fn users_db() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(CREATE_USERS_SQL).unwrap();
    conn
}

pub fn count_users(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap()
}

/// SQLite connection that records every statement it is asked to run.
pub struct RecordingConnection {
    inner: Connection,
    statements: RefCell<Vec<String>>,
}

impl RecordingConnection {
    pub fn new(inner: Connection) -> Self {
        Self {
            inner,
            statements: RefCell::new(Vec::new()),
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.statements.borrow().clone()
    }

    pub fn inner(&self) -> &Connection {
        &self.inner
    }
}

impl SqlConnection for RecordingConnection {
    fn driver_name(&self) -> String {
        self.inner.driver_name()
    }

    fn fetch_one(
        &self,
        sql: &str,
        params: &[BoundParam],
    ) -> Result<Option<FetchedRow>, StatementFailure> {
        self.statements.borrow_mut().push(sql.to_string());
        self.inner.fetch_one(sql, params)
    }

    fn execute_bound(&self, sql: &str, params: &[BoundParam]) -> Result<usize, StatementFailure> {
        self.statements.borrow_mut().push(sql.to_string());
        self.inner.execute_bound(sql, params)
    }

    fn last_insert_id(&self) -> i64 {
        self.inner.last_insert_id()
    }
}

/// Connection that only reports a driver name; statements succeed empty.
pub struct StubConnection {
    driver: RefCell<String>,
}

impl StubConnection {
    pub fn new(driver: &str) -> Self {
        Self {
            driver: RefCell::new(driver.to_string()),
        }
    }

    pub fn switch_driver(&self, driver: &str) {
        *self.driver.borrow_mut() = driver.to_string();
    }
}

impl SqlConnection for StubConnection {
    fn driver_name(&self) -> String {
        self.driver.borrow().clone()
    }

    fn fetch_one(
        &self,
        _sql: &str,
        _params: &[BoundParam],
    ) -> Result<Option<FetchedRow>, StatementFailure> {
        Ok(None)
    }

    fn execute_bound(&self, _sql: &str, _params: &[BoundParam]) -> Result<usize, StatementFailure> {
        Ok(0)
    }

    fn last_insert_id(&self) -> i64 {
        0
    }
}
