#[path = "../common/mod.rs"]
mod common;

use airtracker::compose::{
    compose_explorer, ComposeError, ExplorerOptions, FilterSet, Selection, MAX_ROW_CAP,
};
use airtracker::filter::{resolve_all_domains, resolve_domain, FilterColumn, ALL};
use airtracker::report::{self, ReportError};
use airtracker::Value;

fn run(filters: &FilterSet, row_cap: u64) -> airtracker::ResultSet {
    let session = common::fixture_session();
    let options = ExplorerOptions::with_row_cap(row_cap).unwrap();
    report::explore(&session, filters, &options).unwrap()
}

fn flight_numbers(result: &airtracker::ResultSet) -> Vec<String> {
    common::texts(result, "flight_number")
        .into_iter()
        .map(|v| v.expect("flight_number is never NULL in the fixture"))
        .collect()
}

// =============================================================================
// Filter domains
// =============================================================================

#[test]
fn test_airline_domain() {
    let session = common::fixture_session();
    let domain = resolve_domain(&session, FilterColumn::Airline).unwrap();
    assert_eq!(domain.values, vec!["Air India", "IndiGo", "United", "Vistara"]);
    assert_eq!(
        domain.options(),
        vec![ALL, "Air India", "IndiGo", "United", "Vistara"]
    );
}

#[test]
fn test_status_domain_excludes_null() {
    let session = common::fixture_session();
    let domain = resolve_domain(&session, FilterColumn::Status).unwrap();
    assert_eq!(
        domain.values,
        vec![
            "Approaching",
            "Arrived",
            "Canceled",
            "Delayed",
            "Departed",
            "Diverted",
            "Expected",
            "Unknown",
        ]
    );
}

#[test]
fn test_origin_domain_excludes_null() {
    let session = common::fixture_session();
    let domain = resolve_domain(&session, FilterColumn::Origin).unwrap();
    assert_eq!(domain.values, vec!["BLR", "BOM", "DEL", "JFK"]);
}

#[test]
fn test_domains_are_sorted_and_distinct() {
    let session = common::fixture_session();
    let domains = resolve_all_domains(&session).unwrap();
    assert_eq!(
        domains.iter().map(|d| d.column).collect::<Vec<_>>(),
        FilterColumn::ORDER.to_vec()
    );
    for domain in domains {
        let shown: Vec<String> = domain.values.iter().map(Value::to_string).collect();
        let mut sorted = shown.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(shown, sorted, "{}", domain.column);
        assert!(!domain.contains(&Value::from(ALL)));
    }
}

#[test]
fn test_domain_of_empty_table() {
    let session = common::bulk_session(0);
    let domain = resolve_domain(&session, FilterColumn::Airline).unwrap();
    assert!(domain.values.is_empty());
    assert_eq!(domain.options(), vec![ALL]);
}

// =============================================================================
// Explorer
// =============================================================================

#[test]
fn test_no_filters_returns_everything_most_recent_first() {
    let result = run(&FilterSet::all(), MAX_ROW_CAP);
    assert_eq!(result.len(), 14);
    assert_eq!(
        result.columns,
        vec![
            "flight_number",
            "airline_name",
            "aircraft_reg",
            "origin",
            "origin_city",
            "destination",
            "dest_city",
            "scheduled_dep",
            "actual_dep",
            "status",
        ]
    );

    let deps: Vec<String> = common::texts(&result, "scheduled_dep")
        .into_iter()
        .flatten()
        .collect();
    let mut sorted = deps.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(deps, sorted);
    assert_eq!(flight_numbers(&result)[0], "UK902");
}

#[test]
fn test_airline_and_status() {
    let filters = FilterSet::all()
        .with(FilterColumn::Airline, "IndiGo")
        .with(FilterColumn::Status, "Arrived");
    let result = run(&filters, MAX_ROW_CAP);
    assert_eq!(flight_numbers(&result), vec!["6E103", "6E102", "6E101"]);
}

#[test]
fn test_origin_only() {
    let result = run(&FilterSet::all().with(FilterColumn::Origin, "DEL"), MAX_ROW_CAP);
    assert_eq!(result.len(), 8);
    assert!(common::texts(&result, "origin")
        .iter()
        .all(|o| o.as_deref() == Some("DEL")));
}

#[test]
fn test_every_filter_combination() {
    let session = common::fixture_session();
    let options = ExplorerOptions::default();
    let choices = [
        (FilterColumn::Airline, "Air India"),
        (FilterColumn::Status, "Arrived"),
        (FilterColumn::Origin, "DEL"),
    ];

    for mask in 0u8..8 {
        let mut filters = FilterSet::all();
        for (bit, (column, value)) in choices.iter().enumerate() {
            if mask & (1 << bit) != 0 {
                filters.set(*column, Selection::from(*value));
            }
        }

        let bound = compose_explorer(&filters, &options).unwrap();
        assert_eq!(bound.params.len(), mask.count_ones() as usize);
        assert_eq!(bound.sql.matches('?').count(), bound.params.len());

        let result = session.execute_query(&bound).unwrap();
        for row in 0..result.len() {
            for (bit, (column, value)) in choices.iter().enumerate() {
                if mask & (1 << bit) == 0 {
                    continue;
                }
                let name = match column {
                    FilterColumn::Airline => "airline_name",
                    FilterColumn::Status => "status",
                    FilterColumn::Origin => "origin",
                };
                assert_eq!(
                    result.get(row, name).and_then(|v| v.as_str()),
                    Some(*value),
                    "mask {mask:03b}, row {row}"
                );
            }
        }
    }

    // Air India + Arrived + DEL is exactly AI201.
    let all_three = FilterSet::all()
        .with(FilterColumn::Airline, "Air India")
        .with(FilterColumn::Status, "Arrived")
        .with(FilterColumn::Origin, "DEL");
    assert_eq!(flight_numbers(&run(&all_three, MAX_ROW_CAP)), vec!["AI201"]);
}

#[test]
fn test_all_sentinel_is_no_filter() {
    let explicit = FilterSet::all()
        .with(FilterColumn::Airline, ALL)
        .with(FilterColumn::Status, ALL)
        .with(FilterColumn::Origin, ALL);
    assert_eq!(run(&explicit, MAX_ROW_CAP), run(&FilterSet::all(), MAX_ROW_CAP));
}

#[test]
fn test_value_outside_domain_yields_empty() {
    let result = run(
        &FilterSet::all().with(FilterColumn::Airline, "Kingfisher"),
        MAX_ROW_CAP,
    );
    assert!(result.is_empty());
    assert_eq!(result.columns.len(), 10);
}

#[test]
fn test_status_filter_is_case_sensitive() {
    let result = run(
        &FilterSet::all().with(FilterColumn::Status, "arrived"),
        MAX_ROW_CAP,
    );
    assert!(result.is_empty());
}

#[test]
fn test_quote_in_value_is_data() {
    let session = common::fixture_session();
    let filters = FilterSet::all().with(FilterColumn::Airline, "IndiGo'; DROP TABLE flights; --");
    let result = report::explore(&session, &filters, &ExplorerOptions::default()).unwrap();
    assert!(result.is_empty());

    let everything = report::explore(&session, &FilterSet::all(), &ExplorerOptions::default())
        .unwrap();
    assert_eq!(everything.len(), 14);
}

// =============================================================================
// Row cap
// =============================================================================

#[test]
fn test_row_cap_keeps_most_recent() {
    let full = run(&FilterSet::all(), MAX_ROW_CAP);
    for cap in 1..=5u64 {
        let capped = run(&FilterSet::all(), cap);
        assert_eq!(capped.len(), cap as usize);
        assert_eq!(capped.rows[..], full.rows[..cap as usize]);
    }
    assert_eq!(
        flight_numbers(&run(&FilterSet::all(), 3)),
        vec!["UK902", "UK901", "6E107"]
    );
}

#[test]
fn test_default_cap_on_large_table() {
    let session = common::bulk_session(250);
    let result = report::explore(&session, &FilterSet::all(), &ExplorerOptions::default()).unwrap();
    assert_eq!(result.len(), 200);
    // flight_id 250 is the latest departure.
    assert_eq!(flight_numbers(&result)[0], "6E1250");
    assert_eq!(flight_numbers(&result)[199], "6E1051");
}

#[test]
fn test_row_cap_out_of_range() {
    assert_eq!(
        ExplorerOptions::with_row_cap(0).unwrap_err(),
        ComposeError::InvalidRowCap(0)
    );
    assert_eq!(
        ExplorerOptions::with_row_cap(MAX_ROW_CAP + 1).unwrap_err(),
        ComposeError::InvalidRowCap(MAX_ROW_CAP + 1)
    );

    let session = common::fixture_session();
    let err = report::explore(&session, &FilterSet::all(), &ExplorerOptions { row_cap: 500 })
        .unwrap_err();
    assert!(matches!(err, ReportError::Compose(ComposeError::InvalidRowCap(500))));
}
