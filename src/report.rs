//! The presentation boundary: one function per dashboard view.
//!
//! Each function takes the caller's [`Session`], builds or looks up its
//! query, executes it, and hands back a [`ResultSet`] (or a typed summary).
//! Errors from the layers below are folded into [`ReportError`].

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::catalog::{self, CatalogError};
use crate::compose::{compose_explorer, ComposeError, ExplorerOptions, FilterSet};
use crate::filter::{resolve_all_domains, FilterDomain};
use crate::schema::{aircraft, airports, flights};
use crate::sql::{col, count_distinct, count_star, Expr, Query, TableRef};
use crate::store::{ResultSet, Session, StoreError};

/// Result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;

/// Any failure while producing a report.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error("failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ReportError {
    /// Whether the session must be abandoned.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReportError::Store(e) if e.is_fatal())
    }
}

/// Landing-page totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub flights: i64,
    pub aircraft: i64,
    pub airports: i64,
    pub airlines: i64,
}

/// A catalog entry together with its result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogReport {
    pub id: &'static str,
    pub title: &'static str,
    pub result: ResultSet,
}

impl CatalogReport {
    /// Comma-separated export with a header row.
    pub fn export_csv(&self) -> String {
        self.result.to_delimited(',')
    }

    /// Export with a custom single-character delimiter.
    pub fn export_delimited(&self, delimiter: char) -> String {
        self.result.to_delimited(delimiter)
    }
}

fn count_query(table: &str, measure: Expr) -> Query {
    Query::new()
        .select(vec![measure])
        .from(TableRef::new(table))
}

fn scalar(session: &Session, query: &Query) -> ReportResult<i64> {
    let result = session.execute(&query.to_string(), &[])?;
    Ok(result
        .rows
        .first()
        .and_then(|row| row.first())
        .and_then(|cell| cell.as_i64())
        .unwrap_or(0))
}

/// Totals of flights, aircraft, airports, and distinct airlines.
pub fn summary(session: &Session) -> ReportResult<Summary> {
    let summary = Summary {
        flights: scalar(session, &count_query(flights::TABLE, count_star()))?,
        aircraft: scalar(session, &count_query(aircraft::TABLE, count_star()))?,
        airports: scalar(session, &count_query(airports::TABLE, count_star()))?,
        airlines: scalar(
            session,
            &count_query(flights::TABLE, count_distinct(col(flights::AIRLINE_NAME))),
        )?,
    };
    info!(?summary, "computed summary");
    Ok(summary)
}

/// Options for every explorer selector.
pub fn explorer_filters(session: &Session) -> ReportResult<Vec<FilterDomain>> {
    Ok(resolve_all_domains(session)?)
}

/// Flights matching `filters`, most recent first, at most `options.row_cap` rows.
pub fn explore(
    session: &Session,
    filters: &FilterSet,
    options: &ExplorerOptions,
) -> ReportResult<ResultSet> {
    let bound = compose_explorer(filters, options)?;
    let result = session.execute_query(&bound)?;
    info!(
        rows = result.len(),
        filters = bound.params.len(),
        "explorer query complete"
    );
    Ok(result)
}

/// Pretty-printed JSON for a result or report.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> ReportResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Run the catalog entry named by slug or title.
pub fn run_catalog(session: &Session, key: &str) -> ReportResult<CatalogReport> {
    let entry = catalog::lookup(key)?;
    let result = session.execute(&entry.query().to_string(), &[])?;
    info!(id = entry.id, rows = result.len(), "catalog query complete");
    Ok(CatalogReport {
        id: entry.id,
        title: entry.title,
        result,
    })
}
