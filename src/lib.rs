//! # airtracker
//!
//! A read-only reporting layer over a SQLite database of flights, aircraft,
//! and airports.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            Presentation (bin/airtracker CLI)             │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [report]
//! ┌──────────────────┬──────────────────┬───────────────────┐
//! │  filter domains  │  explorer query  │   query catalog   │
//! │    [filter]      │    [compose]     │    [catalog]      │
//! └──────────────────┴──────────────────┴───────────────────┘
//!                          │
//!                          ▼ [sql builder: Expr → Query → TokenStream]
//! ┌─────────────────────────────────────────────────────────┐
//! │          SQL text + positional bound parameters          │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [store]
//! ┌─────────────────────────────────────────────────────────┐
//! │        Session (read-only SQLite) → ResultSet            │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use airtracker::prelude::*;
//!
//! let session = Session::open("air_tracker.db")?;
//! let filters = FilterSet::all().with(FilterColumn::Airline, "IndiGo");
//! let flights = report::explore(&session, &filters, &ExplorerOptions::default())?;
//! let csv = report::run_catalog(&session, "top-3-destinations")?.export_csv();
//! ```

pub mod catalog;
pub mod compose;
pub mod config;
pub mod filter;
pub mod report;
pub mod schema;
pub mod sql;
pub mod store;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{CatalogEntry, CatalogError};
    pub use crate::compose::{
        compose_explorer, ComposeError, ExplorerOptions, FilterComposer, FilterSet, Selection,
    };
    pub use crate::filter::{resolve_domain, FilterColumn, FilterDomain};
    pub use crate::report::{self, CatalogReport, ReportError, ReportResult, Summary};
    pub use crate::sql::Dialect;
    pub use crate::store::{BoundQuery, ResultSet, Session, StoreError, Value};
}

// Also export at crate root for convenience
pub use report::{ReportError, ReportResult};
pub use store::{ResultSet, Session, Value};
