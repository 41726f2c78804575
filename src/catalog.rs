//! The fixed menu of pre-authored report queries.
//!
//! Every entry is an unparameterized aggregate over the three relations,
//! built with the SQL builder so that table and column names come from
//! [`crate::schema`]. Entries are pure: rendering one twice yields the same
//! text, and nothing about them depends on explorer state.
//!
//! Two entries encode join semantics that must not drift:
//!
//! - `domestic-international` LEFT JOINs both airports and keeps a flight
//!   when *either* side resolves. A half-resolved flight is reported with the
//!   other side's columns missing.
//! - `airports-no-arrivals` is a LEFT JOIN anti-join filtered on the joined
//!   key being NULL, never `NOT IN`, which misbehaves when the subquery
//!   yields NULLs.

use serde::Serialize;
use thiserror::Error;

use crate::schema::{aircraft, airports, flights, FlightStatus};
use crate::sql::{
    case_when, coalesce, col, count, count_distinct, count_star, lit_int, lit_str, sum,
    table_col, Dialect, Expr, ExprExt, OrderByExpr, Query, SelectExpr, TableRef,
};

/// Result type for catalog lookups.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised by the catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("unknown catalog query: {0}")]
    UnknownQuery(String),
}

/// One menu entry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CatalogEntry {
    /// Stable slug used on the command line.
    pub id: &'static str,
    /// Menu title.
    pub title: &'static str,
    #[serde(skip)]
    build: fn() -> Query,
}

impl CatalogEntry {
    /// The entry's query AST.
    pub fn query(&self) -> Query {
        (self.build)()
    }

    /// The entry's query text for `dialect`.
    pub fn sql(&self, dialect: Dialect) -> String {
        self.query().to_sql(dialect)
    }

    fn matches(&self, key: &str) -> bool {
        self.id == key || self.title == key
    }
}

static CATALOG: [CatalogEntry; 10] = [
    CatalogEntry {
        id: "flights-per-model",
        title: "Total flights per aircraft model",
        build: flights_per_model,
    },
    CatalogEntry {
        id: "aircraft-over-5-flights",
        title: "Aircraft with more than 5 flights",
        build: aircraft_over_5_flights,
    },
    CatalogEntry {
        id: "airports-over-5-outbound",
        title: "Airports with >5 outbound flights",
        build: airports_over_5_outbound,
    },
    CatalogEntry {
        id: "top-3-destinations",
        title: "Top 3 destination airports",
        build: top_3_destinations,
    },
    CatalogEntry {
        id: "domestic-international",
        title: "Flights labeled Domestic/International",
        build: domestic_international,
    },
    CatalogEntry {
        id: "recent-arrivals-del",
        title: "5 most recent arrivals at DEL",
        build: recent_arrivals_del,
    },
    CatalogEntry {
        id: "airports-no-arrivals",
        title: "Airports with no arriving flights",
        build: airports_no_arrivals,
    },
    CatalogEntry {
        id: "status-by-airline",
        title: "Flight count by status for each airline",
        build: status_by_airline,
    },
    CatalogEntry {
        id: "cancelled-flights",
        title: "All cancelled flights (basic)",
        build: cancelled_flights,
    },
    CatalogEntry {
        id: "city-pairs-multi-model",
        title: "City pairs with >2 aircraft models",
        build: city_pairs_multi_model,
    },
];

/// All entries in menu order.
pub fn entries() -> &'static [CatalogEntry] {
    &CATALOG
}

/// Find an entry by slug or exact title.
pub fn lookup(key: &str) -> CatalogResult<&'static CatalogEntry> {
    CATALOG
        .iter()
        .find(|entry| entry.matches(key))
        .ok_or_else(|| CatalogError::UnknownQuery(key.to_string()))
}

/// Query text for an entry, unchanged between calls.
pub fn query_text(key: &str, dialect: Dialect) -> CatalogResult<String> {
    Ok(lookup(key)?.sql(dialect))
}

// =============================================================================
// Entries
// =============================================================================

// Table aliases shared by the entries below.
const F: &str = "f";
const A: &str = "a";
const AP: &str = "ap";
const ORIGIN: &str = "origin";
const DEST: &str = "dest";

fn flights_as_f() -> TableRef {
    TableRef::new(flights::TABLE).with_alias(F)
}

fn aircraft_joins_flight() -> Expr {
    table_col(F, flights::AIRCRAFT_REG).eq(table_col(A, aircraft::AIRCRAFT_REG))
}

fn flight_count() -> Expr {
    count(table_col(F, flights::FLIGHT_ID))
}

fn flights_per_model() -> Query {
    Query::new()
        .select(vec![
            table_col(A, aircraft::AIRCRAFT_MODEL).alias("aircraft_model"),
            flight_count().alias("total_flights"),
        ])
        .from(flights_as_f())
        .inner_join(
            TableRef::new(aircraft::TABLE).with_alias(A),
            aircraft_joins_flight(),
        )
        .group_by(vec![table_col(A, aircraft::AIRCRAFT_MODEL)])
        .order_by(vec![
            OrderByExpr::desc(col("total_flights")),
            OrderByExpr::asc(col("aircraft_model")),
        ])
}

fn aircraft_over_5_flights() -> Query {
    Query::new()
        .select(vec![
            table_col(A, aircraft::AIRCRAFT_REG).alias("registration"),
            table_col(A, aircraft::AIRCRAFT_MODEL).alias("model"),
            table_col(A, aircraft::MANUFACTURER).alias("manufacturer"),
            flight_count().alias("flight_count"),
        ])
        .from(TableRef::new(aircraft::TABLE).with_alias(A))
        .inner_join(flights_as_f(), aircraft_joins_flight())
        .group_by(vec![
            table_col(A, aircraft::AIRCRAFT_REG),
            table_col(A, aircraft::AIRCRAFT_MODEL),
            table_col(A, aircraft::MANUFACTURER),
        ])
        .having(flight_count().gt(lit_int(5)))
        .order_by(vec![
            OrderByExpr::desc(col("flight_count")),
            OrderByExpr::asc(col("registration")),
        ])
}

/// Airports joined to flights on `icao_code = <flight_column>`, counted.
fn airport_traffic(flight_column: &str, count_alias: &str) -> Query {
    Query::new()
        .select(vec![
            table_col(AP, airports::NAME).alias("name"),
            table_col(AP, airports::CITY).alias("city"),
            flight_count().alias(count_alias),
        ])
        .from(TableRef::new(airports::TABLE).with_alias(AP))
        .inner_join(
            flights_as_f(),
            table_col(AP, airports::ICAO_CODE).eq(table_col(F, flight_column)),
        )
        .group_by(vec![
            table_col(AP, airports::ICAO_CODE),
            table_col(AP, airports::NAME),
            table_col(AP, airports::CITY),
        ])
        .order_by(vec![
            OrderByExpr::desc(col(count_alias)),
            OrderByExpr::asc(col("name")),
        ])
}

fn airports_over_5_outbound() -> Query {
    airport_traffic(flights::ORIGIN_ICAO, "outbound_flights").having(flight_count().gt(lit_int(5)))
}

fn top_3_destinations() -> Query {
    airport_traffic(flights::DEST_ICAO, "arriving_flights").limit(3)
}

fn domestic_international() -> Query {
    let flight_type = case_when(
        vec![(
            table_col(ORIGIN, airports::COUNTRY).eq(table_col(DEST, airports::COUNTRY)),
            lit_str("Domestic"),
        )],
        Some(lit_str("International")),
    );

    Query::new()
        .select(vec![
            table_col(F, flights::FLIGHT_NUMBER).alias("flight_number"),
            table_col(ORIGIN, airports::IATA_CODE).alias("origin"),
            table_col(ORIGIN, airports::COUNTRY).alias("origin_country"),
            table_col(DEST, airports::IATA_CODE).alias("destination"),
            table_col(DEST, airports::COUNTRY).alias("dest_country"),
            flight_type.alias("flight_type"),
        ])
        .from(flights_as_f())
        .left_join(
            TableRef::new(airports::TABLE).with_alias(ORIGIN),
            table_col(F, flights::ORIGIN_ICAO).eq(table_col(ORIGIN, airports::ICAO_CODE)),
        )
        .left_join(
            TableRef::new(airports::TABLE).with_alias(DEST),
            table_col(F, flights::DEST_ICAO).eq(table_col(DEST, airports::ICAO_CODE)),
        )
        .filter(
            table_col(ORIGIN, airports::ICAO_CODE)
                .is_not_null()
                .or(table_col(DEST, airports::ICAO_CODE).is_not_null()),
        )
        .order_by(vec![OrderByExpr::asc(table_col(F, flights::FLIGHT_ID))])
        .limit(50)
}

fn recent_arrivals_del() -> Query {
    Query::new()
        .select(vec![
            table_col(F, flights::FLIGHT_NUMBER).alias("flight_number"),
            table_col(F, flights::AIRLINE_NAME).alias("airline_name"),
            table_col(F, flights::SCHEDULED_ARR).alias("scheduled_arrival"),
            table_col(F, flights::ACTUAL_ARR).alias("actual_arrival"),
            table_col(F, flights::STATUS).alias("status"),
        ])
        .from(flights_as_f())
        .left_join(
            TableRef::new(airports::TABLE).with_alias(DEST),
            table_col(F, flights::DEST_ICAO).eq(table_col(DEST, airports::ICAO_CODE)),
        )
        .filter(table_col(DEST, airports::IATA_CODE).eq(lit_str("DEL")))
        .order_by(vec![
            OrderByExpr::desc(coalesce(vec![
                table_col(F, flights::ACTUAL_ARR),
                table_col(F, flights::SCHEDULED_ARR),
            ])),
            OrderByExpr::desc(table_col(F, flights::FLIGHT_ID)),
        ])
        .limit(5)
}

fn airports_no_arrivals() -> Query {
    Query::new()
        .select(vec![
            table_col(AP, airports::IATA_CODE).alias("iata_code"),
            table_col(AP, airports::NAME).alias("name"),
            table_col(AP, airports::CITY).alias("city"),
            table_col(AP, airports::COUNTRY).alias("country"),
        ])
        .from(TableRef::new(airports::TABLE).with_alias(AP))
        .left_join(
            flights_as_f(),
            table_col(AP, airports::ICAO_CODE).eq(table_col(F, flights::DEST_ICAO)),
        )
        .filter(table_col(F, flights::FLIGHT_ID).is_null())
        .order_by(vec![
            OrderByExpr::asc(table_col(AP, airports::NAME)),
            OrderByExpr::asc(table_col(AP, airports::ICAO_CODE)),
        ])
}

/// `SUM(CASE WHEN <condition> THEN 1 ELSE 0 END)`
fn tally(condition: Expr) -> Expr {
    sum(case_when(vec![(condition, lit_int(1))], Some(lit_int(0))))
}

fn status_by_airline() -> Query {
    let status = || col(flights::STATUS);

    let mut select: Vec<SelectExpr> = vec![SelectExpr::new(col(flights::AIRLINE_NAME))];
    for known in FlightStatus::KNOWN {
        select.push(tally(status().eq(lit_str(known.as_str()))).alias(known.column_name()));
    }

    // Anything outside the named buckets, NULL included, so the buckets
    // always add up to the total.
    let known_values = FlightStatus::KNOWN
        .iter()
        .map(|s| lit_str(s.as_str()))
        .collect();
    select.push(
        tally(status().is_null().or(status().not_in_list(known_values))).alias("other"),
    );
    select.push(count_star().alias("total_flights"));

    Query::new()
        .select(select)
        .from(TableRef::new(flights::TABLE))
        .group_by(vec![col(flights::AIRLINE_NAME)])
        .order_by(vec![
            OrderByExpr::desc(col("total_flights")),
            OrderByExpr::asc(col(flights::AIRLINE_NAME)),
        ])
}

fn cancelled_flights() -> Query {
    Query::new()
        .select(vec![
            SelectExpr::new(col(flights::FLIGHT_NUMBER)),
            SelectExpr::new(col(flights::AIRLINE_NAME)),
            col(flights::ORIGIN_IATA).alias("origin"),
            col(flights::DEST_IATA).alias("destination"),
            SelectExpr::new(col(flights::SCHEDULED_DEP)),
            SelectExpr::new(col(flights::STATUS)),
        ])
        .from(TableRef::new(flights::TABLE))
        .filter(col(flights::STATUS).eq(lit_str(FlightStatus::Canceled.as_str())))
        .order_by(vec![
            OrderByExpr::desc(col(flights::SCHEDULED_DEP)),
            OrderByExpr::desc(col(flights::FLIGHT_ID)),
        ])
        .limit(50)
}

fn city_pairs_multi_model() -> Query {
    let model_count = || count_distinct(table_col(A, aircraft::AIRCRAFT_MODEL));

    Query::new()
        .select(vec![
            table_col(ORIGIN, airports::CITY).alias("origin_city"),
            table_col(DEST, airports::CITY).alias("dest_city"),
            table_col(ORIGIN, airports::IATA_CODE).alias("origin_code"),
            table_col(DEST, airports::IATA_CODE).alias("dest_code"),
            model_count().alias("aircraft_model_count"),
        ])
        .from(flights_as_f())
        .left_join(
            TableRef::new(aircraft::TABLE).with_alias(A),
            aircraft_joins_flight(),
        )
        .left_join(
            TableRef::new(airports::TABLE).with_alias(ORIGIN),
            table_col(F, flights::ORIGIN_ICAO).eq(table_col(ORIGIN, airports::ICAO_CODE)),
        )
        .left_join(
            TableRef::new(airports::TABLE).with_alias(DEST),
            table_col(F, flights::DEST_ICAO).eq(table_col(DEST, airports::ICAO_CODE)),
        )
        .group_by(vec![
            table_col(ORIGIN, airports::CITY),
            table_col(DEST, airports::CITY),
            table_col(ORIGIN, airports::IATA_CODE),
            table_col(DEST, airports::IATA_CODE),
        ])
        .having(model_count().gt(lit_int(2)))
        .order_by(vec![
            OrderByExpr::desc(col("aircraft_model_count")),
            OrderByExpr::asc(col("origin_city")),
            OrderByExpr::asc(col("dest_city")),
        ])
        .limit(20)
}
