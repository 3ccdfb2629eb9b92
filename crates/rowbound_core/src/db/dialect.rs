//! Driver dialect detection and identifier quoting.

use crate::db::driver::SqlConnection;

/// SQL dialect families with distinct identifier quoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
    Postgres,
    SqlServer,
    Unknown,
}

impl Dialect {
    /// Maps a driver name to its dialect. Matching is case-insensitive.
    pub fn from_driver_name(driver: &str) -> Self {
        match driver.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" => Self::MySql,
            "sqlite" | "sqlite3" => Self::Sqlite,
            "pgsql" | "postgres" | "postgresql" => Self::Postgres,
            "sqlsrv" | "mssql" | "dblib" => Self::SqlServer,
            _ => Self::Unknown,
        }
    }

    /// Reads the driver name from `conn`. Not cached.
    pub fn detect(conn: &dyn SqlConnection) -> Self {
        Self::from_driver_name(&conn.driver_name())
    }

    /// Wraps `name` in this dialect's identifier quotes.
    ///
    /// No escaping is applied; callers pass schema-validated identifiers.
    pub fn quote(self, name: &str) -> String {
        match self {
            Self::MySql | Self::Sqlite => format!("`{name}`"),
            Self::Postgres => format!("\"{name}\""),
            Self::SqlServer => format!("[{name}]"),
            Self::Unknown => name.to_string(),
        }
    }
}

/// Quotes `name` for the dialect of `conn`.
pub fn quote_identifier(conn: &dyn SqlConnection, name: &str) -> String {
    Dialect::detect(conn).quote(name)
}
