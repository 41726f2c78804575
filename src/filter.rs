//! Filter domain resolution for the flight explorer selectors.
//!
//! A domain is the distinct set of observed values of one column, sorted
//! ascending. Domains are recomputed on every call; nothing is cached.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::compose::Selection;
use crate::schema::flights;
use crate::sql::{col, ExprExt, OrderByExpr, Query, TableRef};
use crate::store::{Session, StoreResult, Value};

/// The sentinel option meaning "no predicate on this column".
pub const ALL: &str = "All";

/// Columns that drive an explorer selector, in composition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterColumn {
    Airline,
    Status,
    Origin,
}

impl FilterColumn {
    /// All selector columns in the order their predicates are appended.
    pub const ORDER: [FilterColumn; 3] =
        [FilterColumn::Airline, FilterColumn::Status, FilterColumn::Origin];

    /// The `flights` column this selector filters on.
    pub fn column(&self) -> &'static str {
        match self {
            FilterColumn::Airline => flights::AIRLINE_NAME,
            FilterColumn::Status => flights::STATUS,
            FilterColumn::Origin => flights::ORIGIN_IATA,
        }
    }

    /// Human label for the selector.
    pub fn label(&self) -> &'static str {
        match self {
            FilterColumn::Airline => "Airline",
            FilterColumn::Status => "Status",
            FilterColumn::Origin => "Origin",
        }
    }

    /// `SELECT DISTINCT col FROM flights WHERE col IS NOT NULL ORDER BY col`.
    pub fn domain_query(&self) -> Query {
        let column = self.column();
        Query::new()
            .select(vec![col(column)])
            .distinct()
            .from(TableRef::new(flights::TABLE))
            .filter(col(column).is_not_null())
            .order_by(vec![OrderByExpr::asc(col(column))])
    }
}

impl fmt::Display for FilterColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "airline" | "airline_name" => Ok(FilterColumn::Airline),
            "status" => Ok(FilterColumn::Status),
            "origin" | "origin_iata" => Ok(FilterColumn::Origin),
            other => Err(format!("unknown filter column: {}", other)),
        }
    }
}

/// Observed values of one selector column, exactly as stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterDomain {
    pub column: FilterColumn,
    pub values: Vec<Value>,
}

impl FilterDomain {
    /// Selector options: [`Selection::All`] followed by one per value.
    pub fn options(&self) -> Vec<Selection> {
        std::iter::once(Selection::All)
            .chain(self.values.iter().cloned().map(Selection::Value))
            .collect()
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.values.contains(value)
    }
}

/// Distinct non-null values of `column`, ascending.
pub fn resolve_domain(session: &Session, column: FilterColumn) -> StoreResult<FilterDomain> {
    let sql = column.domain_query().to_string();
    let result = session.execute(&sql, &[])?;

    let values: Vec<Value> = result
        .rows
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .filter(|cell| !cell.is_missing())
        .collect();

    debug!(column = %column, values = values.len(), "resolved filter domain");
    Ok(FilterDomain { column, values })
}

/// Domains for every selector, in composition order.
pub fn resolve_all_domains(session: &Session) -> StoreResult<Vec<FilterDomain>> {
    FilterColumn::ORDER
        .iter()
        .map(|&column| resolve_domain(session, column))
        .collect()
}
