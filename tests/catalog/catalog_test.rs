#[path = "../common/mod.rs"]
mod common;

use airtracker::catalog::{self, CatalogError};
use airtracker::report::{self, ReportError};
use airtracker::schema::FlightStatus;
use airtracker::sql::Dialect;
use airtracker::{ResultSet, Value};

use common::{ints, texts};

fn run(id: &str) -> ResultSet {
    let session = common::fixture_session();
    report::run_catalog(&session, id)
        .unwrap_or_else(|e| panic!("{id}: {e}"))
        .result
}

fn some(values: &[&str]) -> Vec<Option<String>> {
    values.iter().map(|v| Some(v.to_string())).collect()
}

#[test]
fn test_every_entry_runs() {
    let session = common::fixture_session();
    for entry in catalog::entries() {
        let report = report::run_catalog(&session, entry.id)
            .unwrap_or_else(|e| panic!("{}: {e}", entry.id));
        assert_eq!(report.id, entry.id);
        assert!(!report.result.columns.is_empty(), "{}", entry.id);
    }
}

#[test]
fn test_flights_per_model() {
    let result = run("flights-per-model");
    assert_eq!(
        texts(&result, "aircraft_model"),
        some(&["A320neo", "737 MAX 8", "787-8", "777-300ER"])
    );
    assert_eq!(ints(&result, "total_flights"), vec![7, 2, 2, 1]);
}

#[test]
fn test_aircraft_over_5_flights() {
    let result = run("aircraft-over-5-flights");
    assert_eq!(texts(&result, "registration"), some(&["VT-ANA"]));
    assert_eq!(texts(&result, "manufacturer"), some(&["Airbus"]));
    assert_eq!(ints(&result, "flight_count"), vec![6]);
}

#[test]
fn test_airports_over_5_outbound() {
    let result = run("airports-over-5-outbound");
    assert_eq!(texts(&result, "name"), some(&["Indira Gandhi International"]));
    assert_eq!(ints(&result, "outbound_flights"), vec![8]);
}

#[test]
fn test_top_3_destinations() {
    let result = run("top-3-destinations");
    assert_eq!(
        texts(&result, "name"),
        some(&[
            "Indira Gandhi International",
            "Chhatrapati Shivaji Maharaj International",
            "Heathrow",
        ])
    );
    assert_eq!(ints(&result, "arriving_flights"), vec![5, 4, 1]);
}

#[test]
fn test_domestic_international_labels() {
    let result = run("domestic-international");
    let numbers = texts(&result, "flight_number");
    let row = |number: &str| {
        numbers
            .iter()
            .position(|n| n.as_deref() == Some(number))
            .unwrap_or_else(|| panic!("{number} missing"))
    };

    // Both sides resolve in the same country.
    let domestic = row("6E101");
    assert_eq!(result.get(domestic, "flight_type"), Some(&Value::from("Domestic")));

    // Both sides resolve, countries differ.
    let international = row("AI302");
    assert_eq!(result.get(international, "origin_country"), Some(&Value::from("IN")));
    assert_eq!(result.get(international, "dest_country"), Some(&Value::from("US")));
    assert_eq!(
        result.get(international, "flight_type"),
        Some(&Value::from("International"))
    );

    // Only the origin resolves: kept, destination side missing.
    let half = row("UK901");
    assert_eq!(result.get(half, "origin"), Some(&Value::from("DEL")));
    assert!(result.get(half, "destination").unwrap().is_missing());
    assert!(result.get(half, "dest_country").unwrap().is_missing());
    assert_eq!(result.get(half, "flight_type"), Some(&Value::from("International")));

    // Neither side resolves: dropped.
    assert!(!numbers.contains(&Some("UK902".to_string())));
    assert_eq!(result.len(), 13);
}

#[test]
fn test_domestic_rows_share_a_country() {
    let result = run("domestic-international");
    for row in 0..result.len() {
        let origin = result.get(row, "origin_country").unwrap();
        let dest = result.get(row, "dest_country").unwrap();
        let expected = if !origin.is_missing() && origin == dest {
            "Domestic"
        } else {
            "International"
        };
        assert_eq!(
            result.get(row, "flight_type").and_then(Value::as_str),
            Some(expected),
            "row {row}"
        );
    }
}

#[test]
fn test_recent_arrivals_del() {
    let result = run("recent-arrivals-del");
    assert_eq!(
        texts(&result, "flight_number"),
        some(&["6E106", "UA83", "6E104", "AI202", "6E102"])
    );
    // Flights still en route have no actual arrival.
    assert!(result.get(0, "actual_arrival").unwrap().is_missing());
    assert_eq!(
        result.get(1, "actual_arrival"),
        Some(&Value::from("2024-06-02T20:40:00"))
    );
}

#[test]
fn test_airports_no_arrivals() {
    let result = run("airports-no-arrivals");
    assert_eq!(
        texts(&result, "name"),
        some(&[
            "Chennai International",
            "Netaji Subhas Chandra Bose International",
            "Private Strip",
        ])
    );
    // An airport without an IATA code still qualifies, once.
    assert_eq!(
        texts(&result, "iata_code"),
        vec![Some("MAA".to_string()), Some("CCU".to_string()), None]
    );
}

#[test]
fn test_status_by_airline() {
    let result = run("status-by-airline");
    assert_eq!(
        texts(&result, "airline_name"),
        some(&["IndiGo", "Air India", "Vistara", "United"])
    );
    assert_eq!(ints(&result, "total_flights"), vec![7, 4, 2, 1]);
    assert_eq!(ints(&result, "arrived"), vec![3, 1, 0, 1]);
    assert_eq!(ints(&result, "canceled"), vec![0, 1, 1, 0]);
    // Diverted (Air India) and NULL (Vistara) land in `other`.
    assert_eq!(ints(&result, "other"), vec![0, 1, 1, 0]);
}

#[test]
fn test_status_buckets_sum_to_total() {
    let result = run("status-by-airline");
    let totals = ints(&result, "total_flights");
    let mut sums = vec![0i64; result.len()];
    let buckets = FlightStatus::KNOWN
        .iter()
        .map(|s| s.column_name())
        .chain(["other"]);
    for bucket in buckets {
        for (sum, n) in sums.iter_mut().zip(ints(&result, bucket)) {
            *sum += n;
        }
    }
    assert_eq!(sums, totals);
}

#[test]
fn test_cancelled_flights() {
    let result = run("cancelled-flights");
    assert_eq!(texts(&result, "flight_number"), some(&["UK902", "AI202"]));
    assert_eq!(
        texts(&result, "status"),
        some(&["Canceled", "Canceled"])
    );
    // UK902 left from an airport with no IATA code.
    assert!(result.get(0, "origin").unwrap().is_missing());
}

#[test]
fn test_city_pairs_multi_model() {
    let result = run("city-pairs-multi-model");
    assert_eq!(texts(&result, "origin_city"), some(&["New Delhi"]));
    assert_eq!(texts(&result, "dest_city"), some(&["Mumbai"]));
    assert_eq!(ints(&result, "aircraft_model_count"), vec![3]);
}

#[test]
fn test_rerun_is_identical() {
    let session = common::fixture_session();
    for entry in catalog::entries() {
        let first = report::run_catalog(&session, entry.id).unwrap();
        let second = report::run_catalog(&session, entry.id).unwrap();
        assert_eq!(first, second, "{}", entry.id);
        assert_eq!(first.export_csv(), second.export_csv(), "{}", entry.id);
    }
}

#[test]
fn test_lookup_by_title() {
    let session = common::fixture_session();
    let report = report::run_catalog(&session, "Top 3 destination airports").unwrap();
    assert_eq!(report.id, "top-3-destinations");

    let report = report::run_catalog(&session, "All cancelled flights (basic)").unwrap();
    assert_eq!(report.id, "cancelled-flights");
    assert_eq!(report.title, "All cancelled flights (basic)");
}

#[test]
fn test_unknown_id() {
    let session = common::fixture_session();
    let err = report::run_catalog(&session, "busiest-runways").unwrap_err();
    assert!(matches!(
        err,
        ReportError::Catalog(CatalogError::UnknownQuery(ref id)) if id == "busiest-runways"
    ));
    assert_eq!(
        catalog::query_text("busiest-runways", Dialect::Sqlite).unwrap_err(),
        CatalogError::UnknownQuery("busiest-runways".into())
    );
}

#[test]
fn test_postgres_text_has_no_placeholders() {
    let sqlite = catalog::query_text("status-by-airline", Dialect::Sqlite).unwrap();
    let postgres = catalog::query_text("status-by-airline", Dialect::Postgres).unwrap();
    assert!(!sqlite.contains('$'));
    assert!(!postgres.contains('$'));
    assert!(postgres.contains("AS \"other\""));
}
