#[path = "../common/mod.rs"]
mod common;

use std::fs;

use airtracker::compose::{ExplorerOptions, FilterSet};
use airtracker::config::Settings;
use airtracker::filter::FilterColumn;
use airtracker::report::{self, ReportError, Summary};
use airtracker::store::{Session, StoreError};
use tempfile::tempdir;

#[test]
fn test_summary() {
    let session = common::fixture_session();
    assert_eq!(
        report::summary(&session).unwrap(),
        Summary {
            flights: 14,
            aircraft: 5,
            airports: 8,
            airlines: 4,
        }
    );
}

#[test]
fn test_summary_of_empty_database() {
    let session = common::bulk_session(0);
    assert_eq!(
        report::summary(&session).unwrap(),
        Summary {
            flights: 0,
            aircraft: 0,
            airports: 0,
            airlines: 0,
        }
    );
}

#[test]
fn test_explorer_filters_feed_explore() {
    let session = common::fixture_session();
    let domains = report::explorer_filters(&session).unwrap();
    assert_eq!(domains.len(), 3);

    // Every observed origin selects at least one flight.
    let origins = &domains[2];
    assert_eq!(origins.column, FilterColumn::Origin);
    for origin in &origins.values {
        let filters = FilterSet::all().with(FilterColumn::Origin, origin.clone());
        let result = report::explore(&session, &filters, &ExplorerOptions::default()).unwrap();
        assert!(!result.is_empty(), "{origin}");
    }
}

#[test]
fn test_domain_value_with_invalid_utf8_selects_its_row() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    common::populate(&conn);
    conn.execute(
        "INSERT INTO flights (flight_id, flight_number, airline_name, scheduled_dep)
         VALUES (99, 'XX1', CAST(X'4169722080' AS TEXT), '2024-06-09T10:00:00')",
        [],
    )
    .unwrap();
    let session = Session::from_connection(conn);

    let airlines = report::explorer_filters(&session).unwrap().remove(0);
    assert_eq!(airlines.column, FilterColumn::Airline);
    let odd = airlines
        .values
        .iter()
        .find(|v| v.as_str().is_none())
        .cloned()
        .unwrap();
    assert_eq!(odd.to_string(), "Air \u{FFFD}");

    let filters = FilterSet::all().with(FilterColumn::Airline, odd);
    let result = report::explore(&session, &filters, &ExplorerOptions::default()).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(
        result.get(0, "flight_number").and_then(|v| v.as_str()),
        Some("XX1")
    );
}

#[test]
fn test_catalog_csv_export() {
    let session = common::fixture_session();
    let report = report::run_catalog(&session, "airports-no-arrivals").unwrap();
    assert_eq!(report.title, "Airports with no arriving flights");
    assert_eq!(
        report.export_csv(),
        "iata_code,name,city,country\n\
         MAA,Chennai International,Chennai,IN\n\
         CCU,Netaji Subhas Chandra Bose International,Kolkata,IN\n\
         ,Private Strip,Nowhere,IN\n"
    );
}

#[test]
fn test_catalog_export_with_delimiter() {
    let session = common::fixture_session();
    let report = report::run_catalog(&session, "flights-per-model").unwrap();
    assert_eq!(
        report.export_delimited(';'),
        "aircraft_model;total_flights\nA320neo;7\n737 MAX 8;2\n787-8;2\n777-300ER;1\n"
    );
}

#[test]
fn test_catalog_json() {
    let session = common::fixture_session();
    let report = report::run_catalog(&session, "aircraft-over-5-flights").unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["id"], "aircraft-over-5-flights");
    assert_eq!(
        json["result"]["columns"],
        serde_json::json!(["registration", "model", "manufacturer", "flight_count"])
    );
    assert_eq!(
        json["result"]["rows"],
        serde_json::json!([["VT-ANA", "A320neo", "Airbus", 6]])
    );
}

#[test]
fn test_settings_drive_a_session() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("air_tracker.db");
    common::write_fixture_db(&db);

    let config = dir.path().join("airtracker.toml");
    fs::write(
        &config,
        format!(
            "[database]\npath = {:?}\n\n[explorer]\nrow_cap = 2\n\n[export]\ndelimiter = \"|\"\n",
            db.display().to_string()
        ),
    )
    .unwrap();

    let settings = Settings::from_file(&config).unwrap();
    let session = Session::open(settings.database.resolved_path().unwrap()).unwrap();

    let result =
        report::explore(&session, &FilterSet::all(), &settings.explorer.options()).unwrap();
    assert_eq!(result.len(), 2);

    let report = report::run_catalog(&session, "top-3-destinations").unwrap();
    let delimiter = settings.export.delimiter_char().unwrap();
    assert!(report
        .export_delimited(delimiter)
        .starts_with("name|city|arriving_flights\n"));
}

#[test]
fn test_missing_database_is_fatal() {
    let dir = tempdir().unwrap();
    let err: ReportError = Session::open(dir.path().join("nope.db"))
        .err()
        .unwrap()
        .into();
    assert!(err.is_fatal());
    assert!(matches!(err, ReportError::Store(StoreError::Connection { .. })));
}

#[test]
fn test_missing_table_is_not_fatal() {
    // A flights table and nothing else.
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE flights (
            flight_id INTEGER PRIMARY KEY, flight_number TEXT, airline_name TEXT,
            aircraft_reg TEXT, origin_iata TEXT, origin_city TEXT, dest_iata TEXT,
            dest_city TEXT, scheduled_dep TEXT, actual_dep TEXT, status TEXT
        );
        INSERT INTO flights (flight_id, flight_number) VALUES (1, 'AI101');",
    )
    .unwrap();
    let session = Session::from_connection(conn);

    let err = report::run_catalog(&session, "flights-per-model").unwrap_err();
    assert!(matches!(err, ReportError::Store(StoreError::Query { .. })));
    assert!(!err.is_fatal());
    assert!(report::summary(&session).is_err());

    // The session survives.
    let result = report::explore(&session, &FilterSet::all(), &ExplorerOptions::default()).unwrap();
    assert_eq!(result.len(), 1);
}
