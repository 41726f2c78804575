//! Data access error types.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while talking to the flight database.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The database file could not be opened.
    #[error("cannot open flight database {}: {source}", path.display())]
    Connection {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed to prepare, bind, or step.
    #[error("query failed: {source}\nSQL: {sql}")]
    Query {
        sql: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The statement is not a single read-only query.
    #[error("only single SELECT statements are allowed: {0}")]
    NotReadOnly(String),
}

impl StoreError {
    pub(crate) fn query(sql: &str, source: rusqlite::Error) -> Self {
        Self::Query {
            sql: sql.to_string(),
            source,
        }
    }

    /// Whether the session is unusable after this error.
    ///
    /// Only a failed connection is fatal; a bad query leaves the session
    /// ready for the next one.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Connection { .. })
    }
}
