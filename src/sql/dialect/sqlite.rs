//! SQLite SQL dialect.
//!
//! - ANSI identifier quoting (`"`)
//! - No native boolean type (1/0)
//! - Anonymous positional parameters (`?`), bound in order of appearance

use super::helpers;
use super::SqlDialect;

/// SQLite SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Sqlite;

impl SqlDialect for Sqlite {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".into()
    }
}
