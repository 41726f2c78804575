//! Read-only data access over the SQLite flight database.
//!
//! A [`Session`] owns one connection for its whole lifetime. There is no
//! process-wide handle: every caller opens (or is handed) its own session
//! and passes it down to the report functions.
//!
//! # Guarantees
//!
//! - The connection is opened with `SQLITE_OPEN_READ_ONLY`.
//! - Statements are screened before execution: anything other than a single
//!   query is rejected with [`StoreError::NotReadOnly`].
//! - Parameters bind positionally, in placeholder order.
//! - NULL comes back as [`Value::Missing`].

mod error;
mod result;
mod value;

pub use error::{StoreError, StoreResult};
pub use result::ResultSet;
pub use value::Value;

use std::path::Path;

use rusqlite::{params_from_iter, Connection, OpenFlags};
use serde::Serialize;
use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use tracing::{debug, info, warn};

/// SQL text paired with the values for its placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// A single connection to the flight database.
pub struct Session {
    conn: Connection,
}

impl Session {
    /// Open the database at `path` read-only.
    ///
    /// Fails with [`StoreError::Connection`] if the file is missing or is not
    /// a SQLite database.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        let connection_error = |source| StoreError::Connection {
            path: path.to_path_buf(),
            source,
        };

        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_NO_MUTEX
            | OpenFlags::SQLITE_OPEN_URI;
        let conn = Connection::open_with_flags(path, flags).map_err(connection_error)?;

        // SQLite opens lazily; touch the schema so a non-database file fails here.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(connection_error)?;

        info!(path = %path.display(), "opened flight database");
        Ok(Self { conn })
    }

    /// Wrap an existing connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Execute `sql`, binding `params` positionally.
    pub fn execute(&self, sql: &str, params: &[Value]) -> StoreResult<ResultSet> {
        ensure_single_query(sql)?;
        debug!(sql, params = params.len(), "executing query");

        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| StoreError::query(sql, e))?;

        if !stmt.readonly() {
            warn!(sql, "rejected statement that writes");
            return Err(StoreError::NotReadOnly(sql.to_string()));
        }

        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let width = columns.len();
        let mut result = ResultSet::new(columns);

        let mut rows = stmt
            .query(params_from_iter(params.iter()))
            .map_err(|e| StoreError::query(sql, e))?;

        while let Some(row) = rows.next().map_err(|e| StoreError::query(sql, e))? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                let cell = row.get_ref(i).map_err(|e| StoreError::query(sql, e))?;
                cells.push(Value::from(cell));
            }
            result.rows.push(cells);
        }

        debug!(rows = result.len(), "query complete");
        Ok(result)
    }

    /// Execute a composed query.
    pub fn execute_query(&self, query: &BoundQuery) -> StoreResult<ResultSet> {
        self.execute(&query.sql, &query.params)
    }
}

/// Reject anything that is not exactly one query statement.
///
/// Text the parser cannot read is passed through so SQLite reports the
/// syntax error as a [`StoreError::Query`]; the read-only connection and
/// the prepared statement's read-only check still apply.
fn ensure_single_query(sql: &str) -> StoreResult<()> {
    match Parser::parse_sql(&SQLiteDialect {}, sql) {
        Ok(statements) => match statements.as_slice() {
            [Statement::Query(_)] => Ok(()),
            _ => {
                warn!(sql, count = statements.len(), "rejected non-query statement");
                Err(StoreError::NotReadOnly(sql.to_string()))
            }
        },
        Err(e) => {
            debug!(sql, error = %e, "statement did not pre-parse");
            Ok(())
        }
    }
}
