//! Filter-to-query composition for the flight explorer.
//!
//! The explorer starts from a fixed base query whose WHERE clause is the
//! always-true `1 = 1`, then appends one `AND <column> = <placeholder>` per
//! selected filter. Selected values never enter the SQL text: they travel in
//! [`BoundQuery::params`], in the same order as their placeholders.
//!
//! ```text
//! FilterSet { airline: Value("IndiGo"), status: All, origin: Value("DEL") }
//!
//!   WHERE 1 = 1 AND "airline_name" = ? AND "origin_iata" = ?
//!   params = ["IndiGo", "DEL"]
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::filter::{FilterColumn, ALL};
use crate::schema::flights;
use crate::sql::{col, lit_int, param, Dialect, ExprExt, OrderByExpr, Query, SelectExpr, TableRef};
use crate::store::{BoundQuery, Value};

/// Largest row cap the explorer accepts.
pub const MAX_ROW_CAP: u64 = 200;

/// Row cap used when none is configured.
pub const DEFAULT_ROW_CAP: u64 = 200;

/// Result type for composition.
pub type ComposeResult<T> = Result<T, ComposeError>;

/// Errors raised while composing an explorer query.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("row cap must be between 1 and {max}, got {0}", max = MAX_ROW_CAP)]
    InvalidRowCap(u64),
}

// =============================================================================
// Selections
// =============================================================================

/// What the user picked in one selector.
///
/// A value picked from a [`FilterDomain`](crate::filter::FilterDomain) keeps
/// the stored cell as-is, so binding it always matches the rows it came from.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum Selection {
    /// No predicate.
    #[default]
    All,
    /// `column = value`.
    Value(Value),
}

impl Selection {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Selection::All => None,
            Selection::Value(v) => Some(v),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl From<&str> for Selection {
    fn from(s: &str) -> Self {
        if s == ALL {
            Selection::All
        } else {
            Selection::Value(Value::from(s))
        }
    }
}

impl From<Value> for Selection {
    fn from(value: Value) -> Self {
        Selection::Value(value)
    }
}

impl From<Option<String>> for Selection {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(v) => Selection::from(v.as_str()),
            None => Selection::All,
        }
    }
}

impl FromStr for Selection {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Selection::from(s))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str(ALL),
            Selection::Value(v) => write!(f, "{}", v),
        }
    }
}

impl PartialEq<&str> for Selection {
    fn eq(&self, other: &&str) -> bool {
        match self {
            Selection::All => *other == ALL,
            Selection::Value(v) => v == other,
        }
    }
}

/// One selection per explorer selector.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterSet {
    pub airline: Selection,
    pub status: Selection,
    pub origin: Selection,
}

impl FilterSet {
    /// No filters selected.
    pub fn all() -> Self {
        Self::default()
    }

    /// Set one selector, builder style.
    pub fn with(mut self, column: FilterColumn, selection: impl Into<Selection>) -> Self {
        self.set(column, selection.into());
        self
    }

    pub fn set(&mut self, column: FilterColumn, selection: Selection) {
        match column {
            FilterColumn::Airline => self.airline = selection,
            FilterColumn::Status => self.status = selection,
            FilterColumn::Origin => self.origin = selection,
        }
    }

    pub fn get(&self, column: FilterColumn) -> &Selection {
        match column {
            FilterColumn::Airline => &self.airline,
            FilterColumn::Status => &self.status,
            FilterColumn::Origin => &self.origin,
        }
    }

    /// Selected `(column, value)` pairs in composition order.
    pub fn active(&self) -> impl Iterator<Item = (FilterColumn, &Value)> + '_ {
        FilterColumn::ORDER
            .into_iter()
            .filter_map(move |column| self.get(column).value().map(|v| (column, v)))
    }
}

// =============================================================================
// Options
// =============================================================================

/// Explorer limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerOptions {
    pub row_cap: u64,
}

impl Default for ExplorerOptions {
    fn default() -> Self {
        Self {
            row_cap: DEFAULT_ROW_CAP,
        }
    }
}

impl ExplorerOptions {
    pub fn with_row_cap(row_cap: u64) -> ComposeResult<Self> {
        let options = Self { row_cap };
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> ComposeResult<()> {
        if (1..=MAX_ROW_CAP).contains(&self.row_cap) {
            Ok(())
        } else {
            Err(ComposeError::InvalidRowCap(self.row_cap))
        }
    }
}

// =============================================================================
// Composer
// =============================================================================

/// Accumulates `column = ?` predicates and their bound values.
///
/// Placeholders are numbered from 1 in the order predicates are pushed, so
/// the parameter list always lines up with the rendered SQL.
#[derive(Debug, Clone)]
pub struct FilterComposer {
    query: Query,
    params: Vec<Value>,
}

impl FilterComposer {
    pub fn new(base: Query) -> Self {
        Self {
            query: base,
            params: Vec::new(),
        }
    }

    /// Append `AND column = <placeholder>` and bind `value` to it.
    pub fn push(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        let index = self.params.len() + 1;
        let query = std::mem::take(&mut self.query);
        self.query = query.filter(col(column).eq(param(index)));
        self.params.push(value.into());
        self
    }

    /// Apply every selected filter in composition order.
    pub fn apply(&mut self, filters: &FilterSet) -> &mut Self {
        for (column, value) in filters.active() {
            self.push(column.column(), value.clone());
        }
        self
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Append ordering and limit, and render for `dialect`.
    pub fn finish(self, order_by: Vec<OrderByExpr>, limit: u64, dialect: Dialect) -> BoundQuery {
        let query = self.query.order_by(order_by).limit(limit);
        BoundQuery {
            sql: query.to_sql(dialect),
            params: self.params,
        }
    }
}

/// The explorer's fixed projection over `flights`, with `WHERE 1 = 1`.
pub fn explorer_base_query() -> Query {
    Query::new()
        .select(vec![
            SelectExpr::new(col(flights::FLIGHT_NUMBER)),
            SelectExpr::new(col(flights::AIRLINE_NAME)),
            SelectExpr::new(col(flights::AIRCRAFT_REG)),
            col(flights::ORIGIN_IATA).alias("origin"),
            SelectExpr::new(col(flights::ORIGIN_CITY)),
            col(flights::DEST_IATA).alias("destination"),
            SelectExpr::new(col(flights::DEST_CITY)),
            SelectExpr::new(col(flights::SCHEDULED_DEP)),
            SelectExpr::new(col(flights::ACTUAL_DEP)),
            SelectExpr::new(col(flights::STATUS)),
        ])
        .from(TableRef::new(flights::TABLE))
        .filter(lit_int(1).eq(lit_int(1)))
}

/// Most recent scheduled departure first; `flight_id` breaks ties.
pub fn explorer_order() -> Vec<OrderByExpr> {
    vec![
        OrderByExpr::desc(col(flights::SCHEDULED_DEP)),
        OrderByExpr::desc(col(flights::FLIGHT_ID)),
    ]
}

/// Compose the explorer query for SQLite.
pub fn compose_explorer(filters: &FilterSet, options: &ExplorerOptions) -> ComposeResult<BoundQuery> {
    compose_explorer_for_dialect(filters, options, Dialect::Sqlite)
}

/// Compose the explorer query for any dialect.
pub fn compose_explorer_for_dialect(
    filters: &FilterSet,
    options: &ExplorerOptions,
    dialect: Dialect,
) -> ComposeResult<BoundQuery> {
    options.validate()?;

    let mut composer = FilterComposer::new(explorer_base_query());
    composer.apply(filters);
    let bound = composer.finish(explorer_order(), options.row_cap, dialect);

    debug!(
        dialect = %dialect,
        params = bound.params.len(),
        row_cap = options.row_cap,
        "composed explorer query"
    );
    Ok(bound)
}
